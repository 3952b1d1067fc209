use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Opens a rule, table or genotype file, transparently peeling off a GZIP
/// layer when the magic bytes say so.
pub fn open_input(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let is_gzip = {
        let buf = reader.fill_buf()?;
        // GZIP magic: 1f 8b
        buf.len() >= 2 && buf[0] == 0x1f && buf[1] == 0x8b
    };

    if is_gzip {
        tracing::debug!("Detected GZIP layer in {}", path.display());
        // MultiGzDecoder also covers BGZF and concatenated members
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn reads_plain_and_gzipped_files() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("plain.csv");
        std::fs::write(&plain, "a;b\n").unwrap();

        let gz = dir.path().join("packed.csv.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"a;b\n").unwrap();
        std::fs::write(&gz, encoder.finish().unwrap()).unwrap();

        for path in [plain, gz] {
            let mut text = String::new();
            open_input(&path).unwrap().read_to_string(&mut text).unwrap();
            assert_eq!(text, "a;b\n");
        }
    }

    #[test]
    fn empty_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "").unwrap();
        let mut text = String::new();
        open_input(&path).unwrap().read_to_string(&mut text).unwrap();
        assert!(text.is_empty());
    }
}
