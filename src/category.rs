use anyhow::{bail, Context, Result};
use itertools::Itertools;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub path: PathBuf,
}

impl Category {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn read_item_names(&self) -> Result<Vec<String>> {
        let content = fs::read_to_string(&self.path).with_context(|| format!("Failed to read category file {:?}", self.path))?;
        Ok(parse_item_names(&content))
    }
}

/// One name per line, surrounding whitespace trimmed, blank lines dropped.
pub fn parse_item_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// All regular files in `dir`, sorted by category name.
pub fn load_categories(dir: &Path) -> Result<Vec<Category>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to list categories in {:?}", dir))?;

    let mut categories = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            categories.push(Category::new(entry.path()));
        }
    }

    Ok(categories.into_iter().sorted_by_key(|c| c.name()).collect())
}

pub fn find_categories(all: &[Category], names: &[String]) -> Result<Vec<Category>> {
    names
        .iter()
        .map(|name| {
            all.iter()
                .find(|c| &c.name() == name)
                .cloned()
                .with_context(|| format!("Unknown category '{}'. Available: {}", name, all.iter().map(|c| c.name()).join(", ")))
        })
        .collect()
}

pub fn render_menu(categories: &[Category]) -> String {
    let mut menu = categories
        .iter()
        .enumerate()
        .map(|(idx, c)| format!("[ {:>3} ] - {}", idx, c.name()))
        .join("\n");
    menu.push_str("\n[ all ] - will go through every category");
    menu
}

/// Prompts until the answer is a valid index or `all`.
pub fn choose_categories<R: BufRead, W: Write>(categories: &[Category], mut input: R, mut output: W) -> Result<Vec<Category>> {
    if categories.is_empty() {
        bail!("No categories to choose from");
    }

    writeln!(output, "{}", render_menu(categories))?;

    loop {
        write!(output, "choose a list to check: ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            bail!("No category chosen");
        }

        let answer = answer.trim();
        if answer == "all" {
            return Ok(categories.to_vec());
        }
        if let Some(category) = answer.parse::<usize>().ok().and_then(|idx| categories.get(idx)) {
            return Ok(vec![category.clone()]);
        }
    }
}
