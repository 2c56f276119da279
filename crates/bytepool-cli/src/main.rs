//! bytepool - Transcode, search, dump and byte-swap binary data
//!
//! A thin scripting front end over `bytepool-core`: every subcommand loads
//! its input into a pooled view and runs one library operation on it.

use anyhow::{bail, Context, Result};
use bytepool_core::{Arena, Encoding, Offset, Pool, View};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Transcode, search, dump and byte-swap binary data
#[derive(Parser, Debug)]
#[command(name = "bytepool")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode text with one encoding and print it re-encoded with another
    Transcode(TranscodeArgs),
    /// Print `path:offset` for every file containing a needle
    Search(SearchArgs),
    /// Print a byte range of a file as text or JSON
    Dump(DumpArgs),
    /// Reverse the byte order of 16, 32 or 64-bit groups of hex input
    Swap(SwapArgs),
}

#[derive(Args, Debug)]
struct TranscodeArgs {
    /// Input text
    text: String,

    /// Encoding the input text is in
    #[arg(long, default_value = "utf8")]
    from: Encoding,

    /// Encoding to print the bytes in
    #[arg(long, default_value = "hex")]
    to: Encoding,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Needle text, decoded with --encoding
    needle: String,

    #[command(flatten)]
    input: InputMode,

    /// Encoding of the needle
    #[arg(short, long, default_value = "utf8")]
    encoding: Encoding,

    /// Report the last occurrence instead of the first
    #[arg(long)]
    last: bool,

    /// Position to search from; negative values count from the end
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<i64>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Path to a single file to search
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory to search recursively
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// File to read
    #[arg(short, long)]
    file: PathBuf,

    /// Encoding of the printed text
    #[arg(short, long, default_value = "hex")]
    encoding: Encoding,

    /// First byte of the range
    #[arg(long, allow_negative_numbers = true)]
    start: Option<i64>,

    /// End of the range (exclusive)
    #[arg(long, allow_negative_numbers = true)]
    end: Option<i64>,

    /// Print the array-of-bytes JSON form instead of text
    #[arg(long, conflicts_with = "inspect")]
    json: bool,

    /// Print the `<Buffer ..>` preview instead of text
    #[arg(long)]
    inspect: bool,
}

#[derive(Args, Debug)]
struct SwapArgs {
    /// Hex-encoded input bytes
    hex: String,

    /// Group width in bits
    #[arg(short, long, value_enum, default_value = "16")]
    width: SwapWidth,
}

/// Byte group width for swapping
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SwapWidth {
    /// 2-byte groups
    #[value(name = "16")]
    Bits16,
    /// 4-byte groups
    #[value(name = "32")]
    Bits32,
    /// 8-byte groups
    #[value(name = "64")]
    Bits64,
}

impl SwapWidth {
    fn bytes(self) -> usize {
        match self {
            SwapWidth::Bits16 => 2,
            SwapWidth::Bits32 => 4,
            SwapWidth::Bits64 => 8,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let pool = Pool::new();
    match cli.command {
        Command::Transcode(args) => println!("{}", transcode(&pool, &args)?),
        Command::Search(args) => {
            for (path, offset) in search(&pool, &args)? {
                println!("{}:{}", path.display(), offset);
            }
        }
        Command::Dump(args) => println!("{}", dump(&pool, &args)?),
        Command::Swap(args) => println!("{}", swap(&pool, &args)?),
    }
    Ok(())
}

fn transcode(pool: &Pool, args: &TranscodeArgs) -> Result<String> {
    let view = pool
        .from_text(&args.text, args.from)
        .with_context(|| format!("Failed to decode input as {}", args.from))?;
    debug!("Decoded {} bytes of {} input", view.len(), args.from);
    Ok(view.to_text(args.to, None, None))
}

/// Load a file into a view without copying it
fn load_file(pool: &Pool, path: &Path) -> Result<View> {
    trace!("Reading {}", path.display());
    let data =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;
    trace!("Read {} bytes from {}", data.len(), path.display());
    pool.from_existing(Arena::from_vec(data), 0, None)
        .with_context(|| format!("Failed to wrap input file: {}", path.display()))
}

fn search(pool: &Pool, args: &SearchArgs) -> Result<Vec<(PathBuf, usize)>> {
    let needle = pool
        .from_text(&args.needle, args.encoding)
        .with_context(|| format!("Failed to decode needle as {}", args.encoding))?;
    if needle.is_empty() && !args.needle.is_empty() {
        warn!("Needle decodes to no bytes as {}", args.encoding);
    }

    let mut hits = Vec::new();
    if let Some(ref file) = args.input.file {
        if !file.is_file() {
            bail!("Input path is not a file: {}", file.display());
        }
        if let Some(offset) = search_file(pool, file, &needle, args)? {
            hits.push((file.clone(), offset));
        }
    } else if let Some(ref directory) = args.input.directory {
        if !directory.is_dir() {
            bail!("Path is not a directory: {}", directory.display());
        }
        info!("Searching directory: {}", directory.display());

        let mut files_searched = 0;
        for entry in WalkDir::new(directory)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_hidden(path) {
                continue;
            }
            files_searched += 1;
            match search_file(pool, path, &needle, args) {
                Ok(Some(offset)) => hits.push((path.to_path_buf(), offset)),
                Ok(None) => trace!("No match in {}", path.display()),
                // Log error but continue with other files
                Err(e) => warn!("Error searching {}: {:#}", path.display(), e),
            }
        }
        info!("Searched {} files, {} matched", files_searched, hits.len());
    } else {
        bail!("Either --file or --directory must be specified")
    }
    Ok(hits)
}

fn search_file(pool: &Pool, path: &Path, needle: &View, args: &SearchArgs) -> Result<Option<usize>> {
    let haystack = load_file(pool, path)?;
    let offset = Offset::from(args.offset);
    // The needle is already decoded; the encoding only decides ucs2 alignment.
    Ok(if args.last {
        haystack.last_index_of(needle, offset, args.encoding)
    } else {
        haystack.index_of(needle, offset, args.encoding)
    })
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn dump(pool: &Pool, args: &DumpArgs) -> Result<String> {
    let view = load_file(pool, &args.file)?;
    if args.json {
        let range = view.slice(Offset::from(args.start), Offset::from(args.end));
        return serde_json::to_string(&range.to_json()).context("Failed to serialize buffer");
    }
    if args.inspect {
        return Ok(view
            .slice(Offset::from(args.start), Offset::from(args.end))
            .inspect());
    }
    Ok(view.to_text(args.encoding, args.start, args.end))
}

fn swap(pool: &Pool, args: &SwapArgs) -> Result<String> {
    let view = pool.from_text(&args.hex, Encoding::Hex)?;
    if view.len() * 2 != args.hex.len() {
        bail!("Input is not a whole number of hex pairs: {}", args.hex);
    }
    view.swap(args.width.bytes())
        .with_context(|| format!("Failed to swap {} bytes", view.len()))?;
    Ok(view.to_text(Encoding::Hex, None, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn search_args(needle: &str, file: Option<PathBuf>, directory: Option<PathBuf>) -> SearchArgs {
        SearchArgs {
            needle: needle.to_string(),
            input: InputMode { file, directory },
            encoding: Encoding::Utf8,
            last: false,
            offset: None,
        }
    }

    #[test]
    fn test_transcode() {
        let pool = Pool::new();
        let args = TranscodeArgs {
            text: "hello".to_string(),
            from: Encoding::Utf8,
            to: Encoding::Base64,
        };
        assert_eq!(transcode(&pool, &args).unwrap(), "aGVsbG8=");

        let args = TranscodeArgs {
            text: "68c3a9".to_string(),
            from: Encoding::Hex,
            to: Encoding::Utf8,
        };
        assert_eq!(transcode(&pool, &args).unwrap(), "hé");
    }

    #[test]
    fn test_search_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.bin");
        fs::write(&path, b"xxneedlexxneedle").unwrap();
        let pool = Pool::new();

        let mut args = search_args("needle", Some(path.clone()), None);
        assert_eq!(search(&pool, &args).unwrap(), vec![(path.clone(), 2)]);

        args.last = true;
        assert_eq!(search(&pool, &args).unwrap(), vec![(path.clone(), 10)]);

        args.offset = Some(-3);
        assert_eq!(search(&pool, &args).unwrap(), vec![(path, 10)]);
    }

    #[test]
    fn test_search_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.bin"), b"\x00\xde\xad").unwrap();
        fs::write(temp_dir.path().join("b.bin"), b"nothing").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested/c.bin"), b"\xde\xad").unwrap();
        fs::write(temp_dir.path().join(".hidden"), b"\xde\xad").unwrap();

        let pool = Pool::new();
        let mut args = search_args("dead", None, Some(temp_dir.path().to_path_buf()));
        args.encoding = Encoding::Hex;
        let hits = search(&pool, &args).unwrap();
        assert_eq!(
            hits,
            vec![
                (temp_dir.path().join("a.bin"), 1),
                (temp_dir.path().join("nested/c.bin"), 0),
            ]
        );
    }

    #[test]
    fn test_search_ucs2_skips_odd_offsets() {
        let temp_dir = TempDir::new().unwrap();
        let odd = temp_dir.path().join("odd.bin");
        let even = temp_dir.path().join("even.bin");
        // 61 00 only straddles code units here
        fs::write(&odd, [0x00, 0x61, 0x00, 0x61, 0x00]).unwrap();
        fs::write(&even, b"b\0a\0").unwrap();
        let pool = Pool::new();

        let mut args = search_args("a", Some(odd), None);
        args.encoding = Encoding::Ucs2;
        assert!(search(&pool, &args).unwrap().is_empty());

        args.input.file = Some(even.clone());
        assert_eq!(search(&pool, &args).unwrap(), vec![(even.clone(), 2)]);

        args.offset = Some(1);
        assert_eq!(search(&pool, &args).unwrap(), vec![(even, 2)]);
    }

    #[test]
    fn test_search_missing_file() {
        let pool = Pool::new();
        let args = search_args("x", Some(PathBuf::from("/nonexistent/file.bin")), None);
        assert!(search(&pool, &args).is_err());
    }

    #[test]
    fn test_dump() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.bin");
        fs::write(&path, b"hello").unwrap();
        let pool = Pool::new();

        let mut args = DumpArgs {
            file: path,
            encoding: Encoding::Hex,
            start: Some(1),
            end: Some(3),
            json: false,
            inspect: false,
        };
        assert_eq!(dump(&pool, &args).unwrap(), "656c");

        args.json = true;
        assert_eq!(
            dump(&pool, &args).unwrap(),
            r#"{"type":"Buffer","data":[101,108]}"#
        );

        args.json = false;
        args.inspect = true;
        args.start = None;
        args.end = None;
        assert_eq!(dump(&pool, &args).unwrap(), "<Buffer 68 65 6c 6c 6f>");
    }

    #[test]
    fn test_swap() {
        let pool = Pool::new();
        let args = SwapArgs {
            hex: "01020304".to_string(),
            width: SwapWidth::Bits32,
        };
        assert_eq!(swap(&pool, &args).unwrap(), "04030201");

        let args = SwapArgs {
            hex: "010203".to_string(),
            width: SwapWidth::Bits16,
        };
        assert!(swap(&pool, &args).is_err());

        let args = SwapArgs {
            hex: "0102zz".to_string(),
            width: SwapWidth::Bits16,
        };
        assert!(swap(&pool, &args).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
