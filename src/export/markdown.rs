use chrono::{DateTime, Local};

use crate::session::{format_time, Annotation, AnnotationKind};

pub fn render(annotations: &[Annotation], generated: DateTime<Local>) -> String {
    let ordered = super::sorted(annotations);
    let (audio, image): (Vec<&Annotation>, Vec<&Annotation>) = ordered
        .into_iter()
        .partition(|a| a.kind() == AnnotationKind::Audio);

    let mut out = String::from("# Annotation Export\n\n");
    out.push_str(&format!("Generated: {}\n\n", generated.format("%Y-%m-%d %H:%M:%S")));

    if !audio.is_empty() {
        out.push_str("## Audio Annotations\n\n");
        for (i, a) in audio.iter().enumerate() {
            let time = a.time().map(format_time).unwrap_or_else(|| "N/A".into());
            out.push_str(&format!("### {}. {}\n", i + 1, a.title));
            out.push_str(&format!("**Time:** {}\n", time));
            out.push_str(&format!("**Note:** {}\n\n", note_or_placeholder(&a.note)));
        }
    }

    if !image.is_empty() {
        out.push_str("## Image Annotations\n\n");
        for (i, a) in image.iter().enumerate() {
            out.push_str(&format!("### {}. {}\n", i + 1, a.title));
            out.push_str(&format!("**Position:** ({}, {})\n", a.x(), a.y().unwrap_or_default()));
            out.push_str(&format!("**Note:** {}\n\n", note_or_placeholder(&a.note)));
        }
    }

    out
}

fn note_or_placeholder(note: &str) -> &str {
    if note.is_empty() {
        "No note"
    } else {
        note
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{audio, image};
    use chrono::TimeZone;

    fn generated() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 17, 14, 5, 9).unwrap()
    }

    #[test]
    fn sections_in_export_order() {
        let mut late = audio("1", 75.4);
        late.note = "Second verse".into();
        let anns = vec![image("2", 40.0, 12.5), late, audio("3", 4.0)];

        let md = render(&anns, generated());
        let expected = "\
# Annotation Export

Generated: 2026-10-17 14:05:09

## Audio Annotations

### 1. Audio 3
**Time:** 0:04
**Note:** No note

### 2. Audio 1
**Time:** 1:15
**Note:** Second verse

## Image Annotations

### 1. Image 2
**Position:** (40, 12.5)
**Note:** No note

";
        assert_eq!(md, expected);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let md = render(&[image("1", 3.0, 4.0)], generated());
        assert!(!md.contains("Audio Annotations"));
        assert!(md.contains("**Position:** (3, 4)"));

        let md = render(&[], generated());
        assert!(!md.contains("Image Annotations"));
        assert_eq!(md, "# Annotation Export\n\nGenerated: 2026-10-17 14:05:09\n\n");
    }
}
