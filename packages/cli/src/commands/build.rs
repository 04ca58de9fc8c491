use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use swatch_common::RealFileSystem;
use swatch_compiler::{build as run_build, BuildOutput, Resolver};
use swatch_engine::EngineOptions;
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: String,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Stylesheet name before the content hash (overrides config)
    #[arg(short, long)]
    pub file_name: Option<String>,

    /// Print the stylesheet to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,
}

pub fn build(args: BuildArgs, cwd: &Path) -> Result<()> {
    let root = cwd.join(&args.path);
    if !root.is_dir() {
        return Err(anyhow!("Project directory does not exist: {}", root.display()));
    }
    let root = fs::canonicalize(&root)?;

    let mut config = Config::load(&root)?;
    if let Some(out_dir) = args.out_dir {
        config.out_dir = out_dir;
    }
    if let Some(file_name) = args.file_name {
        config.file_name = file_name;
    }

    let options = config.build_options(&root, EngineOptions::default());

    if !args.stdout {
        println!("{}", "🔨 Building styles...".bright_blue().bold());
    }

    let output = run_build(&RealFileSystem, &options)?;

    if args.stdout {
        println!("{}", output.asset.source);
        return Ok(());
    }

    let out_dir = config.get_out_dir(&root);
    let written = write_output(&output, &root, &out_dir)?;
    for path in &written {
        let relative = path.strip_prefix(&out_dir).unwrap_or(path);
        println!("  {} {}", "✓".green(), relative.display());
    }

    let unreachable = unreachable_modules(&config, &root, &output);
    for path in &unreachable {
        let relative = path.strip_prefix(&root).unwrap_or(path);
        println!(
            "  {} {} uses {} but is not reachable from the entries",
            "⚠️".yellow(),
            relative.display(),
            config.package_name.bright_white()
        );
    }

    println!();
    println!(
        "{} Built {} with {} classes from {} modules",
        "✅".green(),
        output.asset.file_name.bright_white(),
        output.caches.len(),
        output.modules.len()
    );

    Ok(())
}

/// Write modules, source maps, pages, the asset and the snapshot under
/// `out_dir`, mirroring their place under `root`
fn write_output(output: &BuildOutput, root: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (path, module) in &output.modules {
        let target = out_dir.join(path.strip_prefix(root).unwrap_or(path));
        let map_target = map_path(&target);
        let map_name = map_target
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let code = format!("{}\n//# sourceMappingURL={}\n", module.code, map_name);
        write_file(&target, &code)?;
        write_file(&map_target, &swatch_sourcemap::to_json(&module.map)?)?;
        written.push(target);
    }

    for (path, html) in &output.pages {
        let target = out_dir.join(path.strip_prefix(root).unwrap_or(path));
        write_file(&target, html)?;
        written.push(target);
    }

    let asset = out_dir.join(&output.asset.file_name);
    write_file(&asset, &output.asset.source)?;
    written.push(asset);

    let snapshot = out_dir.join(output.asset.snapshot_file_name());
    write_file(&snapshot, &output.snapshot)?;
    written.push(snapshot);

    Ok(written)
}

fn map_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Modules under the source directory that import the css package but were
/// never reached from an entry
fn unreachable_modules(config: &Config, root: &Path, output: &BuildOutput) -> Vec<PathBuf> {
    let src_dir = config.get_src_dir(root);
    let resolver = Resolver::new(&RealFileSystem, root, &config.aliases, &config.extensions);

    WalkDir::new(&src_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| resolver.is_script(path) && !output.visited.contains(path))
        .filter(|path| {
            fs::read_to_string(path)
                .map(|source| source.contains(&config.package_name))
                .unwrap_or(false)
        })
        .collect()
}
