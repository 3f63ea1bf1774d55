//! Display functions for references, flakes and dependency trees

use std::fmt::Write;

use console::Style;

use crate::flake::{Dependencies, Flake};
use crate::flakeref::{FlakeRef, Location};
use crate::registry::Registries;

fn label(text: &str) -> String {
    format!("{:<14}", format!("{text}:"))
}

fn field(out: &mut String, name: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {} {}", Style::new().bold().apply_to(label(name)), value);
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// Parts and predicates of a reference
pub fn render_flake_ref(flake_ref: &FlakeRef) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", Style::new().bold().yellow().apply_to(flake_ref));
    field(&mut out, "Kind", flake_ref.kind());

    match &flake_ref.location {
        Location::Alias { alias } => field(&mut out, "Alias", alias),
        Location::GitHub { owner, repo } => {
            field(&mut out, "Owner", owner);
            field(&mut out, "Repository", repo);
        }
        Location::Git { uri } => field(&mut out, "URI", uri),
        Location::Path { path } => field(&mut out, "Path", path),
    }

    let rev_name = if flake_ref.is_tarball() { "Hash" } else { "Rev" };
    field(&mut out, "Ref", or_dash(flake_ref.git_ref.clone()));
    field(
        &mut out,
        rev_name,
        or_dash(flake_ref.rev.as_ref().map(ToString::to_string)),
    );
    if !flake_ref.subdir.is_empty() {
        field(&mut out, "Subdir", &flake_ref.subdir);
    }
    field(&mut out, "Direct", yes_no(flake_ref.is_direct()));
    field(&mut out, "Immutable", yes_no(flake_ref.is_immutable()));
    field(&mut out, "Dirty", yes_no(flake_ref.is_dirty()));
    out
}

/// Metadata of a fetched flake
pub fn render_flake(flake: &Flake) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", Style::new().bold().yellow().apply_to(&flake.id));
    if !flake.description.is_empty() {
        field(&mut out, "Description", &flake.description);
    }
    field(&mut out, "Reference", &flake.flake_ref);
    field(&mut out, "Path", flake.path.display());
    if let Some(rev_count) = flake.rev_count {
        field(&mut out, "Revisions", rev_count);
    }
    if let Some(last_modified) = flake.last_modified {
        field(&mut out, "Last modified", last_modified);
    }

    if !flake.requires.is_empty() {
        let _ = writeln!(out, "  {}", Style::new().bold().apply_to("Requires:"));
        for requirement in &flake.requires {
            let _ = writeln!(out, "    - {}", Style::new().cyan().apply_to(requirement));
        }
    }
    if !flake.non_flake_requires.is_empty() {
        let _ = writeln!(out, "  {}", Style::new().bold().apply_to("Non-flake requires:"));
        for (alias, requirement) in &flake.non_flake_requires {
            let _ = writeln!(out, "    - {}: {}", Style::new().cyan().apply_to(alias), requirement);
        }
    }
    out
}

/// One line per flake and non-flake, indented by depth
pub fn render_tree(deps: &Dependencies) -> String {
    let mut out = String::new();
    deps.walk(&mut |node, level| {
        let indent = "  ".repeat(level);
        let _ = writeln!(
            out,
            "{indent}{} {}",
            Style::new().bold().apply_to(&node.flake.id),
            Style::new().dim().apply_to(&node.flake.flake_ref)
        );
        for non_flake in &node.non_flake_deps {
            let _ = writeln!(
                out,
                "{indent}  {} {}",
                Style::new().cyan().apply_to(&non_flake.alias),
                Style::new().dim().apply_to(&non_flake.flake_ref)
            );
        }
    });
    out
}

/// Entries of every registry layer, highest precedence first
pub fn render_registries(registries: &Registries) -> String {
    let mut out = String::new();
    for (kind, registry) in registries.layers() {
        let _ = writeln!(out, "{}", Style::new().bold().green().apply_to(kind));
        if registry.is_empty() {
            let _ = writeln!(out, "  {}", Style::new().dim().apply_to("(empty)"));
        }
        for (from, to) in registry.entries() {
            let _ = writeln!(out, "  {} -> {}", Style::new().cyan().apply_to(from), to);
        }
    }
    out
}
