use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use lean_package_validator::{
    archive, list_archive_artifacts, load_pattern_file, read_manifest, write_manifest, Config,
    ContentGenerator, GlobMatcher, LeanError, ManifestComparator, TreeScanner, DEFAULT_REVISION,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Validate the .gitattributes export-ignore entries of a repository so its archives stay lean",
    long_about = None
)]
struct Args {
    /// Repository directory to validate (defaults to current directory)
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Create the .gitattributes file with the expected content when missing or invalid
    #[arg(long, short)]
    create: bool,

    /// Overwrite an invalid .gitattributes file with the expected content
    #[arg(long, short)]
    overwrite: bool,

    /// Require export-ignore entries to appear in canonical order
    #[arg(long)]
    enforce_strict_order: bool,

    /// Glob pattern selecting the artifacts to export-ignore
    #[arg(long, conflicts_with = "glob_pattern_file")]
    glob_pattern: Option<String>,

    /// File holding one glob pattern per line
    #[arg(long)]
    glob_pattern_file: Option<PathBuf>,

    /// Check the archive of the current HEAD instead of the .gitattributes file
    #[arg(long)]
    validate_git_archive: bool,

    /// Leave out the `* text=auto eol=lf` header from generated content
    #[arg(long)]
    omit_header: bool,

    /// Show detailed information while validating
    #[arg(long, short)]
    verbose: bool,
}

fn resolve_pattern(args: &Args, config: &Config) -> Result<String> {
    if let Some(pattern) = &args.glob_pattern {
        return Ok(pattern.clone());
    }
    if let Some(path) = &args.glob_pattern_file {
        return load_pattern_file(path)
            .with_context(|| format!("Failed to load glob pattern file {}", path.display()));
    }
    Ok(config.patterns.default.clone())
}

fn validate_archive(
    scanner: &TreeScanner,
    generator: &ContentGenerator,
    verbose: bool,
) -> Result<ExitCode> {
    let exclusions = generator.exclusion_set(&generator.scan(scanner));
    if verbose {
        println!("DEBUG: {} artifacts should be export-ignored", exclusions.len());
    }

    let archived = list_archive_artifacts(scanner.root(), DEFAULT_REVISION)
        .context("Failed to list the archive of the current HEAD")?;
    let verdict = archive::compare(&archived, &exclusions);

    if verdict.is_valid() {
        println!(
            "{}",
            "The archive file of the current HEAD is considered lean.".green()
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{}",
        "The archive file of the current HEAD is not considered lean.".red()
    );
    println!();
    let noun = if verdict.unexpected_artifacts.len() == 1 {
        "artifact"
    } else {
        "artifacts"
    };
    println!("Seems like the following {} slipped in:", noun);
    for artifact in &verdict.unexpected_artifacts {
        println!("{}", artifact);
    }
    println!();

    Ok(ExitCode::FAILURE)
}

fn validate_manifest(
    args: &Args,
    scanner: &TreeScanner,
    generator: &ContentGenerator,
) -> Result<ExitCode> {
    let file_name = generator.config().manifest.file_name.clone();
    let manifest_path = scanner.root().join(&file_name);
    let comparator = ManifestComparator::new(generator.config());
    let rewrite = args.create || args.overwrite;

    let Some(existing) = read_manifest(&manifest_path)? else {
        println!(
            "{}",
            format!(
                "Warning: There is no {} file present in {}.",
                file_name,
                scanner.root().display()
            )
            .yellow()
        );
        println!();

        let expected = generator.expected_for(scanner, !args.omit_header);
        if expected.is_empty() {
            println!(
                "{}",
                format!("Unable to resolve expected {} content.", file_name).red()
            );
            return Ok(ExitCode::FAILURE);
        }
        let content = expected.render();

        if !rewrite {
            println!("Would expect the following {} file content:", file_name);
            print!("{}", content);
            println!();
            println!(
                "Use the --create|-c option to create a {} file with the shown content.",
                file_name
            );
            return Ok(ExitCode::FAILURE);
        }

        return match write_manifest(&manifest_path, &content) {
            Ok(()) => {
                println!("Created a {} file with the shown content:", file_name);
                print!("{}", content);
                println!();
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                println!("{}", format!("Creation of {} file failed.", file_name).red());
                if args.verbose {
                    println!("DEBUG: {:#}", anyhow::Error::from(err));
                }
                Ok(ExitCode::FAILURE)
            }
        };
    };

    let parsed = comparator.parse(&existing);
    if args.verbose {
        println!(
            "DEBUG: {} entries, {} unrecognized lines, header {}",
            parsed.entries().len(),
            parsed.residue().len(),
            if parsed.has_header() { "present" } else { "absent" }
        );
    }

    // Mirror the existing file: only regenerate a header it already had
    let expected = generator.expected_for(scanner, !args.omit_header && parsed.has_header());
    let verdict = comparator.compare_parsed(&parsed, &expected, args.enforce_strict_order);

    if verdict.is_valid() {
        println!(
            "{}",
            format!("The present {} file is considered valid.", file_name).green()
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{}",
        format!("The present {} file is considered invalid.", file_name).red()
    );
    println!();

    let content = verdict
        .expected_content
        .unwrap_or_else(|| expected.render());

    if !rewrite {
        println!("Would expect the following {} file content:", file_name);
        print!("{}", content);
        println!();
        println!(
            "Use the --overwrite|-o option to overwrite the present {} file with the shown content.",
            file_name
        );
        return Ok(ExitCode::FAILURE);
    }

    match write_manifest(&manifest_path, &content) {
        Ok(()) => {
            println!("Overwrote it with the shown content:");
            print!("{}", content);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("{}", format!("Overwrite of {} file failed.", file_name).red());
            if args.verbose {
                println!("DEBUG: {:#}", anyhow::Error::from(err));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run(args: &Args, config: Config) -> Result<ExitCode> {
    let pattern = resolve_pattern(args, &config)?;

    let matcher = match GlobMatcher::compile(&pattern) {
        Ok(matcher) => matcher,
        Err(err) => {
            println!(
                "{}",
                format!(
                    "Warning: The provided glob pattern '{}' is considered invalid.",
                    pattern
                )
                .yellow()
            );
            if args.verbose {
                println!("DEBUG: {:#}", anyhow::Error::from(err));
            }
            return Ok(ExitCode::FAILURE);
        }
    };
    if args.verbose {
        println!("DEBUG: Using glob pattern {}", matcher.as_str());
    }

    let scanner = match TreeScanner::new(&args.directory) {
        Ok(scanner) => scanner.verbose(args.verbose),
        Err(LeanError::DirectoryNotFound(dir)) => {
            println!(
                "{}",
                format!(
                    "Warning: The provided directory '{}' does not exist or is not a directory.",
                    dir.display()
                )
                .yellow()
            );
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    let generator = ContentGenerator::new(config, matcher);

    if args.validate_git_archive {
        validate_archive(&scanner, &generator, args.verbose)
    } else {
        validate_manifest(args, &scanner, &generator)
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = Config::load().context("Failed to load built-in defaults")?;

    run(&args, config)
}
