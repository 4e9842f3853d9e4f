//! Bone hierarchy rendering

use cani2d::skeleton::Skeleton;
use console::Style;

/// Render the skeleton as an indented tree, one bone per line
pub fn render_bone_tree(skeleton: &Skeleton) -> String {
    let mut output = String::new();
    let roots = skeleton.roots();
    for (i, &root) in roots.iter().enumerate() {
        render_bone(skeleton, root, &mut output, "", i + 1 == roots.len(), true);
    }
    output
}

fn render_bone(
    skeleton: &Skeleton,
    index: usize,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    is_root: bool,
) {
    let Some(bone) = skeleton.bone(index) else {
        return;
    };

    let connector = if is_root {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };
    let style = if is_root {
        Style::new().bold().cyan()
    } else {
        Style::new().green()
    };
    let detail = Style::new().dim();

    output.push_str(&format!(
        "{}{}{} {}\n",
        prefix,
        connector,
        style.apply_to(&bone.name),
        detail.apply_to(format!("@ ({:.2}, {:.2})", bone.head.x, bone.head.y))
    ));

    let child_prefix = if is_root {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };
    for (i, &child) in bone.children.iter().enumerate() {
        let is_last_child = i + 1 == bone.children.len();
        render_bone(skeleton, child, output, &child_prefix, is_last_child, false);
    }
}
