use clap::{App, Arg, SubCommand};
use favico::{
    BackgroundKey, ConversionSettings, Converter, IcoDirectory, TargetSize,
};
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

//===========================================================================//

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let matches = App::new("favtool")
        .version("0.1")
        .about("Builds favicon bundles")
        .subcommand(
            SubCommand::with_name("convert")
                .about("Renders PNG icons and a favicon.ico from an image")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("DIR")
                        .short("o")
                        .long("output")
                        .help("Sets output directory"),
                )
                .arg(
                    Arg::with_name("sizes")
                        .takes_value(true)
                        .value_name("LIST")
                        .short("s")
                        .long("sizes")
                        .help("Comma-separated sizes (16,32,48,64,128)"),
                )
                .arg(
                    Arg::with_name("quality")
                        .takes_value(true)
                        .value_name("Q")
                        .short("q")
                        .long("quality")
                        .help("Encoder quality, from 0.1 to 1.0"),
                )
                .arg(
                    Arg::with_name("key-background")
                        .long("key-background")
                        .help("Makes a uniform background transparent"),
                )
                .arg(Arg::with_name("image").required(true)),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists icons in an ICO file")
                .arg(Arg::with_name("ico").required(true)),
        )
        .get_matches();
    if let Some(submatches) = matches.subcommand_matches("convert") {
        let mut settings = ConversionSettings::default();
        if let Some(list) = submatches.value_of("sizes") {
            let mut sizes = Vec::new();
            for item in list.split(',') {
                match item.trim().parse().ok().and_then(TargetSize::from_pixels)
                {
                    Some(size) => sizes.push(size),
                    None => fail(&format!("Unsupported size {:?}", item)),
                }
            }
            settings.sizes = sizes.into_iter().collect();
        }
        if let Some(quality) = submatches.value_of("quality") {
            match quality.parse() {
                Ok(quality) => settings.quality = quality,
                Err(_) => fail(&format!("Invalid quality {:?}", quality)),
            }
        }
        let mut converter = Converter::new(settings);
        if submatches.is_present("key-background") {
            converter = converter.with_preprocess(BackgroundKey::default());
        }
        let path = submatches.value_of("image").unwrap();
        let bytes = fs::read(path).unwrap_or_else(|error| {
            fail(&format!("Cannot read {:?}: {}", path, error))
        });
        let output = converter
            .convert(&bytes)
            .unwrap_or_else(|error| fail(&error.to_string()));
        let out_dir = PathBuf::from(submatches.value_of("output").unwrap_or("."));
        for icon in output.icons() {
            let out_path = out_dir.join(icon.file_name());
            println!("Writing {:?}", out_path);
            fs::write(&out_path, icon.png_data()).unwrap();
        }
        let out_path = out_dir.join(output.ico().file_name());
        println!("Writing {:?}", out_path);
        fs::write(&out_path, output.ico().data()).unwrap();
    } else if let Some(submatches) = matches.subcommand_matches("list") {
        let path = submatches.value_of("ico").unwrap();
        let data = fs::read(path).unwrap();
        if !favico::is_ico(&data) {
            fail(&format!("{:?} is not an ICO file", path));
        }
        let directory = IcoDirectory::read(Cursor::new(data))
            .unwrap_or_else(|error| fail(&error.to_string()));
        for (index, entry) in directory.entries().iter().enumerate() {
            let kind = if entry.is_png() { "PNG" } else { "BMP" };
            println!(
                "{:5}: {}x{} {}, {} bpp, {} bytes at {}",
                index,
                entry.width(),
                entry.height(),
                kind,
                entry.bits_per_pixel(),
                entry.data_size(),
                entry.data_offset()
            );
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("favtool: {}", message);
    process::exit(1);
}

//===========================================================================//
