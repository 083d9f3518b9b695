//! Minimal CLI: cases → JSON, harness → profile source text.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::emit;
use crate::error::Error;
use crate::meta::MethodMeta;
use crate::parser::{self, ParsedCase};

// ------------------------------- Types ------------------------------------- //

/// parse free-form problem examples into typed test cases and emit runnable
/// test harnesses for a target code profile
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// parse examples and print the typed case list as JSON
    Cases(CasesOut),
    /// parse examples and emit a test harness for one profile
    Harness(HarnessOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// method descriptor JSON file ({"params": [...], "return": {...}})
    #[arg(long)]
    meta: PathBuf,

    /// raw example text file
    #[arg(long)]
    examples: PathBuf,

    /// full problem description text, a superset of the examples
    #[arg(long)]
    narrative: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CasesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct HarnessOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// target code profile ("cpp" or "py")
    #[arg(long)]
    profile: String,

    /// solution snippet source file
    #[arg(long)]
    snippet: PathBuf,

    /// template file whose placeholder Solution class is replaced with the
    /// snippet before the harness is appended
    #[arg(long)]
    template: Option<PathBuf>,

    /// output source file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ---------------------------- Implementation ------------------------------- //

impl InputSettings {
    fn load(&self) -> anyhow::Result<(MethodMeta, String, Option<String>)> {
        let meta_src = read_input(&self.meta)?;
        let meta = MethodMeta::from_json_str(&meta_src)
            .with_context(|| format!("bad descriptor in {}", self.meta.display()))?;
        let raw = read_input(&self.examples)?;
        let narrative = match self.narrative.as_ref() {
            Some(path) => Some(read_input(path)?),
            None => None,
        };
        Ok((meta, raw, narrative))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Cases(target) => {
                let (meta, raw, narrative) = target.input_settings.load()?;
                let cases = parser::parse(&raw, &meta, narrative.as_deref());
                let doc: Vec<serde_json::Value> = cases.iter().map(case_json).collect();
                let json = serde_json::to_string_pretty(&doc)?;
                write_output(target.out.as_ref(), &json)?;
                eprintln!("{} {} case(s)", "ok:".green().bold(), cases.len());
            }
            Command::Harness(target) => {
                let emitter = emit::for_profile(&target.profile)?;
                let (meta, raw, narrative) = target.input_settings.load()?;
                if !meta.has_params() {
                    eprintln!(
                        "{} descriptor has no parameters, skipping profile '{}'",
                        "skip:".yellow().bold(),
                        emitter.profile()
                    );
                    return Ok(());
                }
                let snippet = read_input(&target.snippet)?;
                let harness =
                    match emitter.create_test_code(&raw, &meta, &snippet, narrative.as_deref()) {
                        Ok(code) => code,
                        // Degrade to the raw snippet rather than losing the run.
                        Err(err @ Error::Codegen { .. }) => {
                            tracing::warn!(%err, "generation fault, keeping the raw snippet");
                            String::new()
                        }
                        Err(err) => return Err(err.into()),
                    };
                let base = match target.template.as_ref() {
                    Some(path) => {
                        let template = read_input(path)?;
                        emitter.replace_solution_class(&template, &snippet)
                    }
                    None => snippet,
                };
                let output = if harness.is_empty() {
                    base
                } else {
                    format!("{base}\n{harness}")
                };
                write_output(target.out.as_ref(), &output)?;
                eprintln!(
                    "{} harness for profile '{}'",
                    "ok:".green().bold(),
                    emitter.profile()
                );
            }
        }
        Ok(())
    }
}

// ---------------------------- Internal helpers ----------------------------- //

fn case_json(case: &ParsedCase) -> serde_json::Value {
    serde_json::json!({
        "index": case.index,
        "params": case.params.iter().map(|binding| serde_json::json!({
            "name": binding.param.name,
            "type": binding.param.ty.to_string(),
            "value": binding.value.to_string(),
        })).collect::<Vec<_>>(),
        "expected": case.expected,
    })
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(out: Option<&PathBuf>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}
