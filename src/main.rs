use grays_encoder::{Encoder, EncoderCommand, EncoderConfig};

use std::env;
use std::io::{self, BufRead};
use std::process;
use std::sync::mpsc;
use std::thread;

fn main() {
    // Parse --bits/--inner/--outer/--inverted/--instrumentation/--title
    // from the command line
    let mut bit_count: u32 = 2;
    let mut inner_radius = 100.0;
    let mut outer_radius = 150.0;
    let mut invert_tracks = false;
    let mut instrumentation = false;
    let mut window_title = "Grays Encoder".to_string();

    let mut args = env::args().peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bits" => {
                if let Some(Ok(bits)) = args.next().map(|v| v.parse::<u32>()) {
                    bit_count = bits;
                }
            }
            "--inner" => {
                if let Some(Ok(radius)) = args.next().map(|v| v.parse::<f64>()) {
                    inner_radius = radius;
                }
            }
            "--outer" => {
                if let Some(Ok(radius)) = args.next().map(|v| v.parse::<f64>()) {
                    outer_radius = radius;
                }
            }
            "--inverted" => invert_tracks = true,
            "--instrumentation" => instrumentation = true,
            "--title" => {
                if let Some(title) = args.next() {
                    window_title = title;
                }
            }
            _ => {}
        }
    }

    let config = EncoderConfig::builder()
        .title(window_title)
        .bit_count(bit_count)
        .inner_radius(inner_radius)
        .outer_radius(outer_radius)
        .invert_tracks(invert_tracks)
        .instrumentation(instrumentation)
        .build();

    let mut encoder = Encoder::new(config);
    print_code_table(&mut encoder);

    // Feed console lines to the window as live configuration updates.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(command) = parse_command(line.trim()) {
                if sender.send(command).is_err() {
                    break;
                }
            }
        }
    });

    if let Err(err) = encoder.show_with_commands(receiver) {
        eprintln!("window error: {err}");
        process::exit(1);
    }
}

fn print_code_table(encoder: &mut Encoder) {
    let bit_count = encoder.ring().bit_count();
    println!("gray codes for n = {bit_count}:");
    for code in encoder.sequence() {
        println!("{code:0width$b}", width = bit_count as usize);
    }
}

/// Parses one console line into an encoder command. A bare integer sets
/// the bit count; otherwise `<key> <value>` with keys `bits`, `inner`,
/// `outer`, `inverted`, `instrumentation`.
fn parse_command(line: &str) -> Option<EncoderCommand> {
    if line.is_empty() {
        return None;
    }
    if let Ok(bits) = line.parse::<u32>() {
        return Some(EncoderCommand::SetBitCount(bits));
    }

    let mut parts = line.split_whitespace();
    let key = parts.next()?;
    let value = parts.next();
    match key {
        "bits" => value?.parse().ok().map(EncoderCommand::SetBitCount),
        "inner" => value?.parse().ok().map(EncoderCommand::SetInnerRadius),
        "outer" => value?.parse().ok().map(EncoderCommand::SetOuterRadius),
        "inverted" => Some(EncoderCommand::SetInvertTracks(parse_flag(value))),
        "instrumentation" => Some(EncoderCommand::SetInstrumentation(parse_flag(value))),
        _ => None,
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(value, None | Some("on") | Some("true") | Some("1"))
}
