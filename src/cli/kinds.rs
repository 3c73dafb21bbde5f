//! Catalogue listing for the `kinds` command

use std::fmt::Write;

use crate::catalogue::{self, ArgShape, KINDS};

/// Render every expression kind with its aliases and argument shape.
pub fn get_kinds_overview() -> String {
    let mut out = String::from("DFTLY EXPRESSION KINDS\n\n");
    for spec in KINDS.iter() {
        let _ = writeln!(out, "{}", spec.kind);
        let _ = writeln!(out, "  {}", spec.summary);
        let aliases: Vec<&str> = catalogue::aliases()
            .into_iter()
            .filter(|alias| alias.kind == spec.kind)
            .map(|alias| alias.name)
            .collect();
        let _ = writeln!(out, "  aliases:   {}", aliases.join(", "));
        match &spec.shape {
            ArgShape::Positional { min, max, .. } => {
                let arity = match max {
                    Some(max) if max == min => format!("exactly {}", min),
                    Some(max) => format!("{} to {}", min, max),
                    None => format!("at least {}", min),
                };
                let _ = writeln!(out, "  arguments: positional, {}", arity);
            }
            ArgShape::Keyword { fields } => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let mut name = f.name.to_string();
                        if !f.aliases.is_empty() {
                            name = format!("{} ({})", name, f.aliases.join(", "));
                        }
                        if !f.required {
                            name.push('?');
                        }
                        name
                    })
                    .collect();
                let _ = writeln!(out, "  arguments: {}", fields.join(", "));
            }
        }
        out.push('\n');
    }
    out
}
