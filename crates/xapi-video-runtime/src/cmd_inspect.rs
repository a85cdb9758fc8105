//! `xapi-video progress` and `xapi-video threshold`: stateless views of the
//! progress calculator and completion policy.

use xapi_video_core::{MediaDuration, PlayedSegments};

/// Progress line, optionally followed by the merged segment list.
pub(crate) fn format_progress(encoded: &str, duration: f64, merged: bool) -> String {
    let segments = PlayedSegments::decode(encoded);
    let mut out = format!("{}\n", segments.progress(duration));
    if merged {
        out.push_str(&segments.merged().encode());
        out.push('\n');
    }
    out
}

pub(crate) fn format_threshold(duration: f64) -> anyhow::Result<String> {
    let threshold = MediaDuration::Unset.freeze(duration)?.threshold()?;
    Ok(threshold.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_only() {
        assert_eq!(format_progress("0[.]5[,]12[.]22", 100.0, false), "0.15\n");
    }

    #[test]
    fn progress_with_merged_list() {
        assert_eq!(
            format_progress("0[.]5[,]4[.]22", 44.0, true),
            "0.5\n0[.]22\n"
        );
    }

    #[test]
    fn threshold_for_long_media() {
        assert_eq!(format_threshold(900.0).expect("threshold"), "0.95");
    }

    #[test]
    fn threshold_rejects_zero() {
        let err = format_threshold(0.0).expect_err("zero");
        assert!(err.to_string().contains("must be strictly positive"));
    }
}
