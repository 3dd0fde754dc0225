//! Command-line front end: list or extract the members of a ZIP archive
//! read from a local path or an HTTP URL.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

use zipdex::{Archive, Cli, HttpRangeReader, LocalFileReader, ReadAt, ZipExtractor};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    if cli.is_http_url() {
        let reader = HttpRangeReader::new(cli.file.clone())
            .with_context(|| format!("cannot open {}", cli.file))?;
        let transferred_before = reader.transferred_bytes();

        process_zip(&reader, &cli)?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            let transferred = reader.transferred_bytes() - transferred_before;
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
    } else {
        let reader = LocalFileReader::new(Path::new(&cli.file))
            .with_context(|| format!("cannot open {}", cli.file))?;
        process_zip(reader, &cli)?;
    }

    Ok(())
}

/// List or extract, depending on the CLI flags.
fn process_zip<R: ReadAt>(reader: R, cli: &Cli) -> Result<()> {
    let archive = Archive::open_with(reader, cli.open_options())
        .with_context(|| format!("cannot read {} as a ZIP archive", cli.file))?;
    log::info!("{}: {} members", cli.file, archive.len());

    if cli.list || cli.verbose {
        list_files(&archive, cli.verbose);
        return Ok(());
    }

    let extractor = ZipExtractor::new(&archive);
    let selected = select_members(&archive, cli);

    for pattern in cli.files.iter().filter(|f| !has_glob_chars(f)) {
        let found = selected
            .iter()
            .any(|&i| archive.name_lossy(i).is_some_and(|n| matches_name(pattern, &n)));
        if !found && !cli.is_very_quiet() {
            eprintln!("caution: filename not matched:  {pattern}");
        }
    }

    let show_filename = cli.pipe && selected.len() > 1;
    for index in selected {
        extract_member(&extractor, &archive, index, cli, show_filename)?;
    }

    Ok(())
}

/// Indices of the members the command line asks for, in directory order.
///
/// Directory members are dropped when piping or junking paths; otherwise
/// they are kept so empty directories are recreated.
fn select_members<R: ReadAt>(archive: &Archive<R>, cli: &Cli) -> Vec<usize> {
    (0..archive.len())
        .filter(|&index| {
            let member = &archive.members()[index];
            if member.is_directory && (cli.pipe || cli.junk_paths) {
                return false;
            }
            let name = archive.name_lossy(index).unwrap_or_default();

            if !cli.files.is_empty() && !cli.files.iter().any(|f| matches_name(f, &name)) {
                return false;
            }

            !cli
                .exclude
                .iter()
                .any(|x| name.contains(x.as_str()) || glob_match(x, &name))
        })
        .collect()
}

/// Print the member table.
///
/// `-l` prints names only; `-v` adds sizes, ratio, method and timestamp.
fn list_files<R: ReadAt>(archive: &Archive<R>, verbose: bool) {
    if verbose {
        println!(
            "{:>10}  {:>6}  {:>10}  {:>5}  {:>10}  {:>5}  {:>8}  Name",
            "Length", "Method", "Size", "Cmpr", "Date", "Time", "CRC-32"
        );
        println!("{}", "-".repeat(80));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for (index, member) in archive.members().iter().enumerate() {
        let name = archive.name_lossy(index).unwrap_or_default();
        if !verbose {
            println!("{name}");
            continue;
        }

        let (year, month, day) = member.mod_date();
        let (hour, minute, _second) = member.mod_time();
        println!(
            "{:>10}  {:>6}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {:08x}  {}",
            member.uncompressed_size,
            member.compression_method.name(),
            member.compressed_size,
            ratio(member.compressed_size as u64, member.uncompressed_size as u64),
            year,
            month,
            day,
            hour,
            minute,
            member.crc32,
            name
        );

        if !member.is_directory {
            total_uncompressed += member.uncompressed_size as u64;
            total_compressed += member.compressed_size as u64;
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(80));
        println!(
            "{:>10}  {:>6}  {:>10}  {}  {:>31}  {} files",
            total_uncompressed,
            "",
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
        if !archive.comment().is_empty() {
            println!("{}", String::from_utf8_lossy(archive.comment()));
        }
    }
}

/// Space saved by compression, as a right-aligned percentage.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed == 0 || compressed >= uncompressed {
        return "  0%".to_string();
    }
    format!("{:>3}%", 100 - compressed * 100 / uncompressed)
}

/// Extract one member to stdout or to disk, honouring overwrite flags.
fn extract_member<R: ReadAt>(
    extractor: &ZipExtractor<'_, R>,
    archive: &Archive<R>,
    index: usize,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    let name = archive.name_lossy(index).unwrap_or_default();

    if cli.pipe {
        if show_filename {
            let mut stdout = std::io::stdout();
            writeln!(stdout, "--- {name} ---")?;
        }
        extractor
            .extract_to_stdout(index)
            .with_context(|| format!("cannot extract {name}"))?;
        return Ok(());
    }

    let root = cli
        .extract_dir
        .as_deref()
        .map_or_else(PathBuf::new, PathBuf::from);
    let output_path = extractor
        .output_path(index, &root, cli.junk_paths)
        .with_context(|| format!("skipping {name}"))?;

    let is_directory = archive.members()[index].is_directory;
    if output_path.exists() && !is_directory && (cli.never_overwrite || !cli.overwrite) {
        if !cli.is_quiet() {
            let hint = if cli.never_overwrite { "file exists" } else { "use -o to overwrite" };
            eprintln!("Skipping: {name} ({hint})");
        }
        return Ok(());
    }

    if !cli.is_quiet() {
        let action = if is_directory { "creating" } else { "extracting" };
        println!("  {action:>10}: {}", output_path.display());
    }

    extractor
        .extract_to_file(index, &output_path)
        .with_context(|| format!("cannot extract {name} to {}", output_path.display()))?;

    Ok(())
}

/// A requested name matches either the full member name or its last
/// component; patterns containing `*` or `?` are matched as globs.
fn matches_name(pattern: &str, name: &str) -> bool {
    if has_glob_chars(pattern) {
        return glob_match(pattern, name);
    }
    let basename = name.trim_end_matches('/').rsplit('/').next().unwrap_or(name);
    name == pattern || name.trim_end_matches('/') == pattern || basename == pattern
}

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Glob matching with `*` (any run) and `?` (one character).
///
/// Iterative with single-star backtracking, so long names cannot blow up.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        s if s >= GB => format!("{:.2} GB", s as f64 / GB as f64),
        s if s >= MB => format!("{:.2} MB", s as f64 / MB as f64),
        s if s >= KB => format!("{:.2} KB", s as f64 / KB as f64),
        s => format!("{s} bytes"),
    }
}
