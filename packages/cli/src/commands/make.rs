use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use swatch_engine::{ClassMap, Css, EngineOptions, StyleEngine, StyleMap};

#[derive(Debug, Args)]
pub struct MakeArgs {
    /// JSON file holding a style map
    pub input: String,

    /// Print only the class names
    #[arg(long, conflicts_with = "sheet_only")]
    pub classes_only: bool,

    /// Print only the stylesheet
    #[arg(long)]
    pub sheet_only: bool,
}

pub fn make(args: MakeArgs, cwd: &Path) -> Result<()> {
    let path = cwd.join(&args.input);
    if !path.is_file() {
        return Err(anyhow!("Style file does not exist: {}", path.display()));
    }

    let (classes, sheet) = make_from_file(&path)?;

    if !args.sheet_only {
        if !args.classes_only {
            println!("{}", "Classes".bright_blue().bold());
        }
        println!("{}", serde_json::to_string_pretty(&classes)?);
    }
    if !args.classes_only {
        if !args.sheet_only {
            println!();
            println!("{}", "Sheet".bright_blue().bold());
        }
        println!("{}", sheet);
    }

    Ok(())
}

fn make_from_file(path: &Path) -> Result<(ClassMap, String)> {
    let content = fs::read_to_string(path)?;
    let styles: StyleMap = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a style map", path.display()))?;

    let mut css = Css::new(StyleEngine::new(EngineOptions::default()));
    let classes = css.make(&styles);
    Ok((classes, css.serialize_sheet()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styles.json");
        fs::write(
            &path,
            r#"{ "$reset": { "margin": 0 }, "title": { "color": "red", ":hover": { "color": "blue" } } }"#,
        )
        .unwrap();

        let (classes, sheet) = make_from_file(&path).unwrap();

        assert!(classes["$reset"].starts_with("r-"));
        assert_eq!(classes["title"].split(' ').count(), 2);
        assert!(sheet.contains("{margin-top:0px;margin-right:0px;margin-bottom:0px;margin-left:0px}"));
        assert!(sheet.contains(":hover{color:#00f}"));
    }

    #[test]
    fn test_invalid_style_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("styles.json");
        fs::write(&path, "[1, 2]").unwrap();

        let error = make_from_file(&path).unwrap_err();
        assert!(error.to_string().contains("is not a style map"));
    }
}
