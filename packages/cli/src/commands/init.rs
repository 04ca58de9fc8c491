use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

const EXAMPLE_STYLES: &str = r##"import { css, cx } from "@swatch/css";

const styles = css.make({
  $base: { margin: 0 },
  button: {
    paddingHorizontal: 16,
    paddingVertical: 8,
    backgroundColor: "#3366ff",
    color: "white",
    ":hover": { backgroundColor: "#2952cc" },
  },
});

export const buttonClass = cx(styles.$base, styles.button);
"##;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Source directory
    #[arg(short, long, default_value = "src")]
    pub src_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing swatch project...".bright_blue().bold());

    let src_dir = cwd.join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let example_file = src_dir.join("styles.ts");
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_STYLES)?;
        println!("  {} Created {}/styles.ts", "✓".green(), args.src_dir);
    }

    let config = Config {
        src_dir: args.src_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Import {}/styles.ts from a module script of index.html", args.src_dir);
    println!("  2. Run: swatch build");
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_example() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            src_dir: "app".to_string(),
            force: false,
        };

        init(args, dir.path()).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.src_dir, "app");
        assert!(dir.path().join("app/styles.ts").is_file());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "outDir": "out" }"#).unwrap();

        let args = InitArgs {
            src_dir: "src".to_string(),
            force: false,
        };
        init(args, dir.path()).unwrap();

        assert_eq!(Config::load(dir.path()).unwrap().out_dir, "out");
    }
}
