//! huff CLI - Huffman file compressor
//!
//! `huff encode INPUT` writes a tree artifact and a payload artifact;
//! `huff decode` turns them back into the original bytes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use huff::session::{DEFAULT_OUTPUT_PATH, DEFAULT_PAYLOAD_PATH, DEFAULT_TREE_PATH};
use huff::{BitFormat, Config, Encoder, Session, TreeFormat};

/// Huffman entropy coder for arbitrary files.
#[derive(Parser, Debug)]
#[command(name = "huff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a tree for INPUT and encode it
    Encode {
        /// File to compress
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        artifacts: Artifacts,

        /// Store code bits as ASCII '0'/'1' bytes instead of packing them
        #[arg(long)]
        ascii: bool,
    },
    /// Decode the payload artifact with the tree artifact
    Decode {
        /// Destination for the decoded bytes
        #[arg(short, long, value_name = "OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        #[command(flatten)]
        artifacts: Artifacts,
    },
    /// Print the code of every symbol in a tree artifact
    Codes {
        #[command(flatten)]
        artifacts: Artifacts,
    },
}

#[derive(Args, Debug)]
struct Artifacts {
    /// Tree artifact path
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TREE_PATH)]
    tree: PathBuf,

    /// Payload artifact path
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PAYLOAD_PATH)]
    payload: PathBuf,

    /// Tree artifact layout
    #[arg(long, value_enum, default_value = "tagged")]
    tree_format: TreeFormatArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TreeFormatArg {
    /// One tag bit per node; any byte may be a symbol
    Tagged,
    /// '#' marks internal nodes; inputs containing '#' are rejected
    Marker,
}

impl From<TreeFormatArg> for TreeFormat {
    fn from(arg: TreeFormatArg) -> Self {
        match arg {
            TreeFormatArg::Tagged => TreeFormat::Tagged,
            TreeFormatArg::Marker => TreeFormat::Marker,
        }
    }
}

impl Artifacts {
    fn into_config(self, bit_format: BitFormat) -> Config {
        Config {
            tree_path: self.tree,
            payload_path: self.payload,
            bit_format,
            tree_format: self.tree_format.into(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Command::Encode {
            input,
            artifacts,
            ascii,
        } => {
            let format = if ascii {
                BitFormat::Ascii
            } else {
                BitFormat::Packed
            };
            let mut session = Session::new(artifacts.into_config(format));
            let report = session
                .encode_file(&input)
                .with_context(|| format!("failed to encode {}", input.display()))?;
            let config = session.config();
            let payload_bytes = report.header.data_len() + huff::container::HEADER_LEN as u64;
            println!(
                "{} -> {} ({} bytes) + {} ({} bytes)",
                input.display(),
                config.tree_path.display(),
                report.tree_bytes,
                config.payload_path.display(),
                payload_bytes
            );
            if report.input_bytes > 0 {
                let ratio = (report.tree_bytes + payload_bytes) as f64 / report.input_bytes as f64;
                println!(
                    "{} bytes, {} distinct, {} code bits, ratio {:.3}",
                    report.input_bytes, report.distinct_symbols, report.header.bit_len, ratio
                );
            }
        }
        Command::Decode { output, artifacts } => {
            // The bit format is read from the payload header.
            let mut session = Session::new(artifacts.into_config(BitFormat::Packed));
            let report = session.decode_file(&output).with_context(|| {
                format!(
                    "failed to decode {} with {}",
                    session.config().payload_path.display(),
                    session.config().tree_path.display()
                )
            })?;
            println!(
                "{} -> {} ({} bytes)",
                session.config().payload_path.display(),
                output.display(),
                report.output_bytes
            );
        }
        Command::Codes { artifacts } => {
            let mut session = Session::new(artifacts.into_config(BitFormat::Packed));
            let tree_path = session.config().tree_path.clone();
            let tree = session
                .load_tree()
                .with_context(|| format!("failed to read tree {}", tree_path.display()))?;
            let encoder = Encoder::new(tree);
            for (symbol, code) in encoder.codes().iter() {
                let shown = if code.is_empty() {
                    "(empty)".to_string()
                } else {
                    code.to_string()
                };
                println!("{:#04x} {:>3} {}", symbol, code.len(), shown);
            }
        }
    }

    Ok(())
}
