//! Command line inspector: imports an image file the way a dropped file is
//! imported and prints what the image widgets would show.
//!
//! Usage: `vision-pack-inspect <image-file> [x y]`

use std::path::PathBuf;
use std::process::ExitCode;

use vision_pack::display::meta;
use vision_pack::{FileImporter, ImageBuffer, PackConfig, PixelDecoder};

fn usage() -> ExitCode {
    eprintln!("Usage: vision-pack-inspect <image-file> [x y]");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let config = PackConfig::load_from_default_path().unwrap_or_default();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, position) = match args.as_slice() {
        [path] => (PathBuf::from(path), None),
        [path, x, y] => match (x.parse::<i64>(), y.parse::<i64>()) {
            (Ok(x), Ok(y)) => (PathBuf::from(path), Some((x, y))),
            _ => return usage(),
        },
        _ => return usage(),
    };

    let payload = match FileImporter::new().import_path(&path) {
        Ok(payload) => payload,
        Err(e) => {
            log::error!("Failed to import {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    println!("{}", meta::info_line(&payload.image_info));

    if let Some((x, y)) = position {
        let mut decoder = PixelDecoder::new();
        decoder.update_from_payload(&payload);
        let values = decoder.get_pixel(x, y);
        if values.is_none() {
            log::warn!("No pixel at ({}, {})", x, y);
        }
        println!("{}", meta::pixel_line(x as f32, y as f32, values.as_deref()));
    }

    match ImageBuffer::from_payload(&payload) {
        Ok(buffer) => match buffer.expected_len() {
            Some(expected) => log::debug!("Decoded {} bytes ({} expected)", buffer.data.len(), expected),
            None => log::warn!("Payload dimensions {} x {} overflow", buffer.width, buffer.height),
        },
        Err(e) => log::warn!("Payload does not decode: {}", e),
    }

    match serde_json::to_string(&payload) {
        Ok(json) => println!("payload: {} bytes of JSON", json.len()),
        Err(e) => {
            log::error!("Failed to serialize payload: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
