//! Side-marker name flipping and RNA-style data path helpers.

use regex::Regex;
use std::sync::OnceLock;

/// Separators accepted between a name and a single-letter side marker.
const SEPARATORS: [char; 4] = ['.', '_', '-', ' '];

static BONE_PATH_REGEX: OnceLock<Regex> = OnceLock::new();

fn bone_path_regex() -> &'static Regex {
    BONE_PATH_REGEX
        .get_or_init(|| Regex::new(r#"pose\.bones\["([^"]+)"\]"#).expect("invalid regex pattern"))
}

/// Returns the opposite-side name for `name`.
///
/// Handles single-letter markers as suffix (`Arm.L`, `hand_r`) or prefix
/// (`L.Arm`, `r_hand`), and the words left/right at either end with their case
/// preserved (`LeftEye`, `eye_RIGHT`). A trailing `.NNN` number is kept in place.
/// Names without a marker are returned unchanged.
///
/// # Example
///
/// ```
/// use rigkit_ir::naming::flip_name;
///
/// assert_eq!(flip_name("Arm.L"), "Arm.R");
/// assert_eq!(flip_name("thigh_left.001"), "thigh_right.001");
/// assert_eq!(flip_name("Spine"), "Spine");
/// ```
pub fn flip_name(name: &str) -> String {
    let (base, number) = split_number_suffix(name);
    let chars: Vec<char> = base.chars().collect();
    let len = chars.len();

    if len >= 2 {
        // Suffix marker: "Arm.L"
        let last = chars[len - 1];
        if SEPARATORS.contains(&chars[len - 2]) {
            if let Some(flipped) = flip_side_char(last) {
                let mut out: String = chars[..len - 1].iter().collect();
                out.push(flipped);
                out.push_str(number);
                return out;
            }
        }
        // Prefix marker: "L.Arm"
        if SEPARATORS.contains(&chars[1]) {
            if let Some(flipped) = flip_side_char(chars[0]) {
                let mut out = String::with_capacity(name.len());
                out.push(flipped);
                out.extend(&chars[1..]);
                out.push_str(number);
                return out;
            }
        }
    }

    if let Some(flipped) = flip_side_word(base) {
        return format!("{}{}", flipped, number);
    }

    name.to_string()
}

/// Returns true if `name` carries a side marker that [`flip_name`] swaps.
pub fn has_side(name: &str) -> bool {
    flip_name(name) != name
}

fn split_number_suffix(name: &str) -> (&str, &str) {
    if let Some(dot) = name.rfind('.') {
        let digits = &name[dot + 1..];
        if dot > 0 && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return name.split_at(dot);
        }
    }
    (name, "")
}

fn flip_side_char(c: char) -> Option<char> {
    match c {
        'L' => Some('R'),
        'R' => Some('L'),
        'l' => Some('r'),
        'r' => Some('l'),
        _ => None,
    }
}

fn flip_side_word(base: &str) -> Option<String> {
    let lower = base.to_ascii_lowercase();
    for (word, opposite) in [("right", "left"), ("left", "right")] {
        let at_start = lower.starts_with(word);
        let at_end = lower.ends_with(word);
        if !(at_start || at_end) || lower.len() < word.len() {
            continue;
        }
        let start = if at_start { 0 } else { base.len() - word.len() };
        let found = &base[start..start + word.len()];
        let replacement = match_case(found, opposite);
        let mut out = String::with_capacity(base.len() + 1);
        out.push_str(&base[..start]);
        out.push_str(&replacement);
        out.push_str(&base[start + word.len()..]);
        return Some(out);
    }
    None
}

fn match_case(found: &str, word: &str) -> String {
    let mut chars = found.chars();
    let first_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    let second_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    if first_upper && second_upper {
        word.to_ascii_uppercase()
    } else if first_upper {
        let mut out = word.to_string();
        out[..1].make_ascii_uppercase();
        out
    } else {
        word.to_string()
    }
}

/// Returns the data path of a pose bone, e.g. `pose.bones["Arm.L"]`.
pub fn pose_bone_path(bone: &str) -> String {
    format!("pose.bones[\"{}\"]", bone)
}

/// Returns the data path of a constraint on a pose bone.
pub fn constraint_path(bone: &str, constraint: &str) -> String {
    format!("pose.bones[\"{}\"].constraints[\"{}\"]", bone, constraint)
}

/// Joins a bone-relative path onto the bone's data path.
///
/// Paths starting with `[` (custom properties) are appended directly, others
/// with a `.` separator.
pub fn join_bone_path(bone: &str, relative: &str) -> String {
    if relative.starts_with('[') {
        format!("{}{}", pose_bone_path(bone), relative)
    } else {
        format!("{}.{}", pose_bone_path(bone), relative)
    }
}

/// Splits a trailing `[N]` array index off a data path.
///
/// `location[1]` becomes `("location", 1)`; paths without an index (including
/// quoted subscripts like `["prop"]`) return index -1.
pub fn split_array_index(path: &str) -> (&str, i32) {
    if let Some(stripped) = path.strip_suffix(']') {
        if let Some(open) = stripped.rfind('[') {
            if let Ok(index) = stripped[open + 1..].parse::<i32>() {
                return (&path[..open], index);
            }
        }
    }
    (path, -1)
}

/// Returns the first bone name addressed by `pose.bones["..."]` in a path.
pub fn bone_in_path(path: &str) -> Option<&str> {
    bone_path_regex()
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Replaces the first exact quoted occurrence of `from` with `to`.
///
/// Only `"from"` (quotes included) matches, so `Arm.L` never matches inside
/// `Arm.L.001`.
pub fn replace_quoted_once(path: &str, from: &str, to: &str) -> String {
    let needle = format!("\"{}\"", from);
    let replacement = format!("\"{}\"", to);
    path.replacen(&needle, &replacement, 1)
}

/// Returns the part of `path` below `prefix`, if `path` is `prefix` itself or
/// one of its sub-paths.
///
/// The remainder is empty or starts with `.` or `[`, so `pose.bones["Arm.L"]`
/// does not match `pose.bones["Arm.L.001"].location`.
pub fn sub_path<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('.') || rest.starts_with('[')).then_some(rest)
}

/// Returns the constraint name addressed by `.constraints["..."]`, if any.
pub fn constraint_in_path(path: &str) -> Option<&str> {
    let start = path.find(".constraints[\"")? + ".constraints[\"".len();
    let end = path[start..].find('"')? + start;
    Some(&path[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flip_suffix_markers() {
        assert_eq!(flip_name("Arm.L"), "Arm.R");
        assert_eq!(flip_name("Arm.R"), "Arm.L");
        assert_eq!(flip_name("hand_l"), "hand_r");
        assert_eq!(flip_name("foot-R"), "foot-L");
        assert_eq!(flip_name("eye r"), "eye l");
    }

    #[test]
    fn test_flip_prefix_markers() {
        assert_eq!(flip_name("L.Arm"), "R.Arm");
        assert_eq!(flip_name("r_hand"), "l_hand");
    }

    #[test]
    fn test_flip_keeps_number_suffix() {
        assert_eq!(flip_name("Arm.L.001"), "Arm.R.001");
        assert_eq!(flip_name("Spine.001"), "Spine.001");
    }

    #[test]
    fn test_flip_words() {
        assert_eq!(flip_name("LeftEye"), "RightEye");
        assert_eq!(flip_name("eye_right"), "eye_left");
        assert_eq!(flip_name("EYE_LEFT"), "EYE_RIGHT");
        assert_eq!(flip_name("left"), "right");
    }

    #[test]
    fn test_flip_without_marker() {
        assert_eq!(flip_name("Spine"), "Spine");
        assert_eq!(flip_name("Root"), "Root");
        assert_eq!(flip_name(""), "");
        assert_eq!(flip_name("L"), "L");
        assert!(!has_side("Chest"));
        assert!(has_side("Chest.L"));
    }

    #[test]
    fn test_flip_is_involution() {
        for name in ["Arm.L", "r_hand", "LeftEye", "thigh_left.002", "Spine"] {
            assert_eq!(flip_name(&flip_name(name)), name);
        }
    }

    #[test]
    fn test_paths() {
        assert_eq!(pose_bone_path("Arm.L"), "pose.bones[\"Arm.L\"]");
        assert_eq!(
            constraint_path("Arm.L", "IK"),
            "pose.bones[\"Arm.L\"].constraints[\"IK\"]"
        );
        assert_eq!(
            join_bone_path("Arm.L", "[\"fk_ik\"]"),
            "pose.bones[\"Arm.L\"][\"fk_ik\"]"
        );
        assert_eq!(
            join_bone_path("Arm.L", "location"),
            "pose.bones[\"Arm.L\"].location"
        );
    }

    #[test]
    fn test_split_array_index() {
        assert_eq!(split_array_index("location[1]"), ("location", 1));
        assert_eq!(split_array_index("[\"prop\"]"), ("[\"prop\"]", -1));
        assert_eq!(split_array_index("influence"), ("influence", -1));
        assert_eq!(
            split_array_index("constraints[\"IK\"].influence"),
            ("constraints[\"IK\"].influence", -1)
        );
    }

    #[test]
    fn test_bone_in_path() {
        assert_eq!(
            bone_in_path("pose.bones[\"Hand.L\"][\"ik_fk\"]"),
            Some("Hand.L")
        );
        assert_eq!(bone_in_path("[\"ik_fk\"]"), None);
        assert_eq!(
            constraint_in_path("pose.bones[\"A\"].constraints[\"IK.L\"].influence"),
            Some("IK.L")
        );
    }

    #[test]
    fn test_sub_path() {
        let bone = "pose.bones[\"Arm.L\"]";
        assert_eq!(sub_path("pose.bones[\"Arm.L\"].location", bone), Some(".location"));
        assert_eq!(sub_path("pose.bones[\"Arm.L\"][\"fk\"]", bone), Some("[\"fk\"]"));
        assert_eq!(sub_path(bone, bone), Some(""));
        assert_eq!(sub_path("pose.bones[\"Arm.L.001\"].location", bone), None);
        assert_eq!(sub_path("pose.bones[\"Arm.L\"]x", bone), None);
    }

    #[test]
    fn test_replace_quoted_once() {
        let path = "pose.bones[\"Arm.L\"][\"Arm.L\"]";
        assert_eq!(
            replace_quoted_once(path, "Arm.L", "Arm.R"),
            "pose.bones[\"Arm.R\"][\"Arm.L\"]"
        );
        assert_eq!(
            replace_quoted_once("pose.bones[\"Arm.L.001\"]", "Arm.L", "Arm.R"),
            "pose.bones[\"Arm.L.001\"]"
        );
    }
}
