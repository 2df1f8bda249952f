use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use djotmark_core::Converter;

fn main() {
    let mut input: Option<String> = None;
    let mut sanitized = false;
    let mut builder = Converter::builder();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--sanitized" => sanitized = true,
            "--safe" => builder = builder.safe(true),
            "--profile" => match args.next() {
                Some(name) => builder = builder.profile_name(&name),
                None => {
                    eprintln!("--profile expects a name: full | article | comment | minimal");
                    process::exit(2);
                }
            },
            "--soft-break" => match args.next() {
                Some(mode) => builder = builder.soft_break_name(&mode),
                None => {
                    eprintln!("--soft-break expects: newline | space | br");
                    process::exit(2);
                }
            },
            "--toc" => {
                let (min, max) = match args.next().as_deref().map(parse_levels) {
                    Some(Some(levels)) => levels,
                    _ => {
                        eprintln!("--toc expects levels like 1:3");
                        process::exit(2);
                    }
                };
                builder = builder.table_of_contents(min, max);
            }
            "--permalinks" => builder = builder.heading_permalinks(),
            "--semantic-spans" => builder = builder.semantic_spans(),
            "--locale" => match args.next() {
                Some(locale) => builder = builder.smart_quotes_locale(&locale),
                None => {
                    eprintln!("--locale expects: auto | en | de | fr");
                    process::exit(2);
                }
            },
            "--tab-width" => {
                let width = args.next().and_then(|value| value.parse::<usize>().ok());
                match width {
                    Some(width) => builder = builder.code_block_tab_width(width),
                    None => {
                        eprintln!("--tab-width expects a number");
                        process::exit(2);
                    }
                }
            }
            _ => {
                if input.is_none() {
                    input = Some(arg);
                } else {
                    eprintln!("unexpected argument: {}", arg);
                    print_usage();
                    process::exit(2);
                }
            }
        }
    }

    let converter = match builder.build() {
        Ok(converter) => converter,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(2);
        }
    };

    let source = match input {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|err| {
                    eprintln!("failed to read stdin: {}", err);
                    process::exit(1);
                });
            buffer
        }
    };

    let html = if sanitized {
        converter.convert_sanitized(&source)
    } else {
        converter.convert(&source)
    };
    print!("{}", html);
}

fn parse_levels(value: &str) -> Option<(u8, u8)> {
    let (min, max) = value.split_once(':')?;
    Some((min.parse().ok()?, max.parse().ok()?))
}

fn print_usage() {
    eprintln!(
        "Usage: djotmark-cli [--profile full|article|comment|minimal] [--safe] [--sanitized] \
         [--soft-break newline|space|br] [--toc MIN:MAX] [--permalinks] [--semantic-spans] \
         [--locale auto|en|de|fr] [--tab-width N] [input]"
    );
}
