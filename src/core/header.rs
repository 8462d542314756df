/// Header counter fixup — keeps `load_steps` in step with the declarations.

use crate::core::document::DocumentError;

const COUNTER_ANCHOR: &str = "load_steps=";

/// Current counter value, or `None` when the header carries no counter.
pub fn read_counter(header: &str) -> Result<Option<u64>, DocumentError> {
    match counter_span(header) {
        Some((start, end)) => header[start..end]
            .parse()
            .map(Some)
            .map_err(|_| DocumentError::MalformedCounter(header[start..end].to_string())),
        None => Ok(None),
    }
}

/// Return `header` with the counter increased by `added`. Only the numeric
/// substring changes; everything else is copied verbatim.
///
/// A header without a counter gets one inserted, set to `present + added`
/// where `present` is the caller's count of the steps the document already
/// loads.
pub fn bump(header: &str, added: usize, present: u64) -> Result<String, DocumentError> {
    let current = read_counter(header)?;
    if added == 0 {
        return Ok(header.to_string());
    }

    if let (Some(current), Some((start, end))) = (current, counter_span(header)) {
        let updated = current + added as u64;
        return Ok(format!("{}{}{}", &header[..start], updated, &header[end..]));
    }

    let at = header
        .find(" format=")
        .or_else(|| header.rfind(']'))
        .ok_or(DocumentError::MissingHeader)?;
    Ok(format!(
        "{} {}{}{}",
        &header[..at],
        COUNTER_ANCHOR,
        present + added as u64,
        &header[at..]
    ))
}

fn counter_span(header: &str) -> Option<(usize, usize)> {
    let start = header.find(COUNTER_ANCHOR)? + COUNTER_ANCHOR.len();
    let len = header[start..]
        .find(|c: char| c.is_whitespace() || c == ']')
        .unwrap_or(header.len() - start);
    Some((start, start + len))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        r#"[gd_resource type="Resource" script_class="AffixData" load_steps=4 format=3 uid="uid://b7x1"]"#;

    #[test]
    fn bump_rewrites_only_the_number() {
        let bumped = bump(HEADER, 2, 0).unwrap();
        assert_eq!(
            bumped,
            r#"[gd_resource type="Resource" script_class="AffixData" load_steps=6 format=3 uid="uid://b7x1"]"#
        );
        assert_eq!(read_counter(&bumped).unwrap(), Some(6));
    }

    #[test]
    fn bump_by_zero_is_identity() {
        assert_eq!(bump(HEADER, 0, 0).unwrap(), HEADER);
    }

    #[test]
    fn bump_across_digit_boundary() {
        let header = "[gd_resource type=\"Resource\" load_steps=9 format=3]";
        assert_eq!(
            bump(header, 3, 0).unwrap(),
            "[gd_resource type=\"Resource\" load_steps=12 format=3]"
        );
    }

    #[test]
    fn missing_counter_is_inserted() {
        let header = "[gd_resource type=\"Resource\" format=3 uid=\"uid://x\"]";
        assert_eq!(read_counter(header).unwrap(), None);
        assert_eq!(
            bump(header, 1, 4).unwrap(),
            "[gd_resource type=\"Resource\" load_steps=5 format=3 uid=\"uid://x\"]"
        );

        let bare = "[gd_resource type=\"Resource\"]";
        assert_eq!(
            bump(bare, 2, 1).unwrap(),
            "[gd_resource type=\"Resource\" load_steps=3]"
        );
        assert_eq!(bump(bare, 0, 1).unwrap(), bare);
    }

    #[test]
    fn counter_at_end_of_tag() {
        let header = "[gd_resource type=\"Resource\" load_steps=5]";
        assert_eq!(
            bump(header, 1, 0).unwrap(),
            "[gd_resource type=\"Resource\" load_steps=6]"
        );
    }

    #[test]
    fn malformed_counter_is_an_error() {
        let header = "[gd_resource type=\"Resource\" load_steps=many format=3]";
        assert!(matches!(
            bump(header, 1, 0),
            Err(DocumentError::MalformedCounter(v)) if v == "many"
        ));
    }
}
