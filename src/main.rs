//! piano-tutor — practise the built-in melody on a MIDI keyboard.
//!
//! The expected note is printed to stdout and drawn as notation into an SVG
//! file. With the `device` feature messages come from a hardware port;
//! otherwise they are read from stdin, one message per line as bytes
//! (`144 48 100` or `0x90 0x30 0x64`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use pianotutor::{
    forward_to, snapshot_to_json, FileDisplay, FileImageLoader, MidiInput, NotationRenderer,
    NoteGlyphCache, PianoLearningProgram,
};

#[derive(Debug, Parser)]
#[command(version, about = "Learn a melody note by note on a MIDI keyboard")]
struct Args {
    /// Directory holding whole.png, half.png and quarter.png
    #[arg(long, default_value = "images/notes")]
    glyph_dir: PathBuf,

    /// Where the current note's notation is written
    #[arg(long, short, default_value = "notation.svg")]
    output: PathBuf,

    /// Print a JSON progress snapshot after every correct note
    #[arg(long)]
    json: bool,

    /// MIDI input port index
    #[cfg(feature = "device")]
    #[arg(long, default_value_t = 0)]
    port: usize,

    /// List MIDI input ports and exit
    #[cfg(feature = "device")]
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    #[cfg(feature = "device")]
    if args.list_ports {
        for (index, name) in pianotutor::midi::device::port_names()? {
            println!("{index}: {name}");
        }
        return Ok(());
    }

    let glyphs = Arc::new(NoteGlyphCache::new(FileImageLoader::new(&args.glyph_dir)));
    let mut program =
        PianoLearningProgram::with_default_melody(NotationRenderer::new(glyphs), FileDisplay::new(&args.output));
    if args.json {
        program = program.on_advance(|snapshot| println!("{}", snapshot_to_json(snapshot)));
    }

    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();

    #[cfg(feature = "device")]
    let _subscription = {
        let mut input = pianotutor::midi::device::DeviceMidiInput::open(args.port)?;
        input.subscribe(forward_to(sender))?
    };

    #[cfg(not(feature = "device"))]
    {
        let mut input = pianotutor::VirtualMidiInput::new();
        let subscription = input.subscribe(forward_to(sender))?;
        tokio::spawn(read_stdin_messages(input, subscription));
    }

    log::info!("writing notation to {}", args.output.display());
    program
        .run(receiver)
        .await
        .with_context(|| format!("failed to draw notation with glyphs from {}", args.glyph_dir.display()))?;
    Ok(())
}

/// Feed stdin lines to `input` until EOF. Dropping the subscription
/// afterwards closes the message queue.
#[cfg(not(feature = "device"))]
async fn read_stdin_messages(input: pianotutor::VirtualMidiInput, _subscription: pianotutor::SubscriptionHandle) {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match parse_message(&line) {
                Ok(bytes) => input.send(&bytes),
                Err(e) => log::warn!("skipping '{line}': {e}"),
            },
            Ok(None) => break,
            Err(e) => {
                log::error!("failed to read stdin: {e}");
                break;
            }
        }
    }
}

#[cfg_attr(feature = "device", allow(dead_code))]
fn parse_message(line: &str) -> anyhow::Result<Vec<u8>> {
    line.split_whitespace()
        .map(|token| {
            let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
                Some(hex) => u8::from_str_radix(hex, 16),
                None => token.parse::<u8>(),
            };
            parsed.with_context(|| format!("'{token}' is not a byte"))
        })
        .collect()
}
