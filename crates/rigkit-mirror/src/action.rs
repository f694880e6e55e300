//! Mirroring of action curves referenced by action constraints.

use rigkit_ir::live::FCurve;
use rigkit_ir::naming::{pose_bone_path, sub_path};
use rigkit_ir::RigHost;

/// Returns true if a curve on `property[index]` changes sign under an X mirror.
pub fn is_negated_channel(property: &str, index: i32) -> bool {
    matches!(
        (property, index),
        ("location", 0) | ("rotation_euler", 1 | 2) | ("rotation_quaternion", 2 | 3)
    )
}

/// Duplicates every curve of `action` that addresses `source` onto `target`.
///
/// Curves on X location, Y/Z euler rotation and the matching quaternion
/// components get their values and both handles negated. Existing curves on the
/// target are replaced. Returns the number of curves written, or `None` if the
/// action does not exist.
pub fn mirror_action_curves<H: RigHost + ?Sized>(
    host: &mut H,
    action: &str,
    source: &str,
    target: &str,
) -> Option<usize> {
    let prefix = pose_bone_path(source);
    let target_prefix = pose_bone_path(target);

    let mirrored: Vec<FCurve> = host
        .action(action)?
        .fcurves
        .iter()
        .filter_map(|curve| {
            let rest = sub_path(&curve.data_path, &prefix)?;
            let property = rest.strip_prefix('.').unwrap_or(rest);
            let negate = is_negated_channel(property, curve.array_index);
            Some(FCurve {
                data_path: format!("{}{}", target_prefix, rest),
                array_index: curve.array_index,
                keyframes: if negate {
                    curve.keyframes.iter().map(|k| k.negated()).collect()
                } else {
                    curve.keyframes.clone()
                },
            })
        })
        .collect();

    let count = mirrored.len();
    let action = host.action_mut(action)?;
    for curve in mirrored {
        action.put_fcurve(curve);
    }
    log::debug!("mirrored {} curves from '{}' to '{}'", count, source, target);
    Some(count)
}
