fn main() -> anyhow::Result<()> {
    pgx_interpret::cli::run()
}
