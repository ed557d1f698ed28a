//! Tech list resolution.

/// Hard overrides coming from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechFilter {
    /// Replaces whatever was resolved
    pub only: Option<Vec<String>>,
    /// Removed from the final list
    pub exclude: Option<Vec<String>>,
}

/// Resolve the techs to create for one entity on one level.
///
/// Level techs replace plugin techs, explicit techs are appended, and the
/// result is deduplicated keeping first occurrence. A tech suffix taken from
/// a shorthand string replaces the merged list. `only` and `exclude` are
/// applied last.
pub fn resolve_techs(
    explicit: &[String],
    suffix: Option<&str>,
    level_techs: Option<&[String]>,
    plugin_techs: &[String],
    filter: &TechFilter,
) -> Vec<String> {
    let mut techs = match suffix {
        Some(tech) => vec![tech.to_string()],
        None => {
            let configured = level_techs.unwrap_or(plugin_techs);
            dedup(configured.iter().chain(explicit.iter()))
        }
    };

    if let Some(only) = &filter.only {
        techs = dedup(only.iter());
    }

    if let Some(exclude) = &filter.exclude {
        techs.retain(|t| !exclude.contains(t));
    }

    techs
}

fn dedup<'a>(techs: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tech in techs {
        if !tech.is_empty() && !out.contains(tech) {
            out.push(tech.clone());
        }
    }
    out
}
