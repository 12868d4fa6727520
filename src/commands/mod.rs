pub mod analyze;
pub mod journal;
pub mod key;

use crate::catalog::{self, AnalysisContext, RequiredTrait};
use crate::render;

/// Exit code for a run the classifier rejected.
pub const EXIT_REJECTED: i32 = 2;

/// Text to print plus the process exit code it implies.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub code: i32,
}

impl Reply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: 0,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: 1,
        }
    }
}

/// Build the analysis context from the global `--class/--build/--focus/--need` flags.
pub fn build_context(
    class: Option<&str>,
    build: Option<&str>,
    focus: Option<&str>,
    needs: &[String],
) -> Result<AnalysisContext, String> {
    let traits = needs
        .iter()
        .map(|raw| {
            RequiredTrait::parse(raw).ok_or_else(|| {
                format!(
                    "Unknown stat '{raw}'. Choose from: {}",
                    RequiredTrait::ALL.map(RequiredTrait::label).join(", ")
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let context = AnalysisContext::new(class.unwrap_or(""), build.unwrap_or(""))
        .map_err(|e| e.to_string())?
        .with_focus_attribute(focus)
        .with_required_traits(traits);
    tracing::debug!(
        class = context.category(),
        build = context.sub_category(),
        focus = context.focus_attribute().unwrap_or(""),
        needs = context.required_traits().len(),
        "Analysis context"
    );
    Ok(context)
}

/// Static catalog: classes with their builds and mechanics.
pub fn list_classes(json: bool) -> Reply {
    let classes = catalog::class_catalog();
    if json {
        Reply::ok(render::to_json(true, &classes))
    } else {
        Reply::ok(render::classes_text(&classes))
    }
}
