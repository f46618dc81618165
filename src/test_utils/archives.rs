//! Release archives built in memory.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::{Cursor, Write};
use tar::Builder;
use zip::write::SimpleFileOptions;

/// Gzipped tarball holding `files`, every entry with mode 0755.
pub fn build_tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
    build_tar_gz_with_links(files, &[])
}

/// Like [`build_tar_gz`], followed by `(path, target)` symlink entries.
pub fn build_tar_gz_with_links(files: &[(&str, &[u8])], links: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_path(path).unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append(&header, *content).unwrap();
    }

    for (path, target) in links {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_path(path).unwrap();
        header.set_link_name(target).unwrap();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_cksum();
        builder.append(&header, std::io::empty()).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Zip archive holding `files`, every entry with mode 0755.
pub fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o755);

    for (path, content) in files {
        zip.start_file(*path, options).unwrap();
        zip.write_all(content).unwrap();
    }

    zip.finish().unwrap().into_inner()
}
