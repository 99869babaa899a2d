use crate::paths::{self, AGENT_COMMAND_DIRS};
use crate::types::FileRole;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A fn-pointer rule: the first rule whose predicate accepts the normalized
/// relative path decides the role.
pub struct RoleRule {
    pub id: &'static str,
    pub matches: fn(&str) -> bool,
    pub role: FileRole,
}

pub const RULES: &[RoleRule] = &[
    RoleRule {
        id: "constitution",
        matches: is_constitution,
        role: FileRole::Constitution,
    },
    RoleRule {
        id: "feature-spec",
        matches: is_spec,
        role: FileRole::Specification,
    },
    RoleRule {
        id: "feature-plan",
        matches: is_plan,
        role: FileRole::Plan,
    },
    RoleRule {
        id: "feature-tasks",
        matches: is_tasks,
        role: FileRole::Tasks,
    },
    RoleRule {
        id: "agent-command",
        matches: is_agent_command,
        role: FileRole::AgentCommand,
    },
];

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Role of a workspace-relative path. Accepts either separator and an
/// optional leading `./`.
pub fn classify(relative_path: &str) -> FileRole {
    let normalized = normalize(relative_path);
    RULES
        .iter()
        .find(|rule| (rule.matches)(&normalized))
        .map(|rule| rule.role)
        .unwrap_or(FileRole::Other)
}

fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut rest = path.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.trim_end_matches('/').to_string()
}

fn is_constitution(path: &str) -> bool {
    path == paths::CONSTITUTION_FILE
}

fn is_spec(path: &str) -> bool {
    is_feature_file(path, paths::SPEC_MD)
}

fn is_plan(path: &str) -> bool {
    is_feature_file(path, paths::PLAN_MD)
}

fn is_tasks(path: &str) -> bool {
    is_feature_file(path, paths::TASKS_MD)
}

/// `.specify/specs/<feature>/<file>`, exactly one directory deep.
fn is_feature_file(path: &str, file: &str) -> bool {
    let Some(rest) = path
        .strip_prefix(paths::SPECS_DIR)
        .and_then(|r| r.strip_prefix('/'))
    else {
        return false;
    };
    match rest.split_once('/') {
        Some((feature, name)) => !feature.is_empty() && name == file,
        None => false,
    }
}

fn is_agent_command(path: &str) -> bool {
    AGENT_COMMAND_DIRS.iter().any(|dir| {
        path.strip_prefix(dir)
            .and_then(|r| r.strip_prefix('/'))
            .is_some_and(|name| !name.is_empty())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
