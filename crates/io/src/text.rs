use std::path::Path;

/// Read a delimited export as UTF-8, decoding as Windows-1252 when the
/// bytes are not valid UTF-8. Bank and ERP dumps are frequently legacy
/// single-byte encoded; accented text must survive either way.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    match String::from_utf8(bytes) {
        Ok(utf8) => Ok(utf8),
        // from_utf8 hands the buffer back through the error
        Err(invalid) => {
            let bytes = invalid.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_plain_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        fs::write(&path, "Código\tMonto\n").unwrap();
        assert_eq!(read_file_as_utf8(&path).unwrap(), "Código\tMonto\n");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_file_as_utf8(Path::new("/no/such/archivo.txt")).unwrap_err();
        assert!(err.contains("archivo.txt"));
    }

    #[test]
    fn falls_back_to_windows_1252() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.txt");
        // "Año" in Windows-1252: 0xF1 is ñ, invalid as UTF-8
        fs::write(&path, [b'A', 0xF1, b'o']).unwrap();
        assert_eq!(read_file_as_utf8(&path).unwrap(), "Año");
    }
}
