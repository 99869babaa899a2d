//! Plain-text cleanup for captured `specify` output.
//!
//! The CLI renders colored panels and a block-letter logo. Once captured,
//! those are noise: escape sequences break regex parsing and the logo lines
//! carry no information. [`sanitize`] removes both and is idempotent.

use regex::Regex;
use std::sync::OnceLock;

/// A line with more block-art glyphs than this is treated as a banner.
pub const BLOCK_GLYPH_THRESHOLD: usize = 5;

// ---------------------------------------------------------------------------
// Pass 1: escape sequences and control bytes
// ---------------------------------------------------------------------------

static ESCAPE_RE: OnceLock<Regex> = OnceLock::new();
static CONTROL_RE: OnceLock<Regex> = OnceLock::new();

fn escape_re() -> &'static Regex {
    ESCAPE_RE.get_or_init(|| {
        Regex::new(concat!(
            // OSC: ESC ] ... (BEL | ST)
            r"\x1b\][^\x07\x1b\n]*(?:\x07|\x1b\\)?",
            // DCS, SOS, PM, APC: ESC P|X|^|_ ... ST
            r"|\x1b[PX^_][^\x1b\n]*(?:\x1b\\)?",
            // CSI: ESC [ params intermediates final (SGR, cursor, erase, ...)
            r"|\x1b\[[0-?]*[ -/]*[@-~]",
            // 8-bit CSI
            r"|\x{9b}[0-?]*[ -/]*[@-~]",
            // Character set designation: ESC ( B and friends
            r"|\x1b[()*+][0-9A-Za-z]",
            // Remaining two-byte escapes: ESC 7, ESC =, ESC M, ...
            r"|\x1b[0-9:-~]",
        ))
        .unwrap()
    })
}

fn control_re() -> &'static Regex {
    // Everything below 0x20 except \t \n \r, plus DEL and C1 controls.
    CONTROL_RE
        .get_or_init(|| Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f-\x{9f}]").unwrap())
}

/// Remove terminal escape sequences and raw control bytes, keeping tab,
/// newline and carriage return.
pub fn strip_control_sequences(raw: &str) -> String {
    let without_escapes = escape_re().replace_all(raw, "");
    control_re().replace_all(&without_escapes, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: decorative lines
// ---------------------------------------------------------------------------

fn is_border_char(c: char) -> bool {
    // Box Drawing block.
    ('\u{2500}'..='\u{257F}').contains(&c)
}

fn is_block_glyph(c: char) -> bool {
    // Block Elements, Geometric Shapes squares, Braille patterns.
    ('\u{2580}'..='\u{259F}').contains(&c)
        || ('\u{25A0}'..='\u{25A1}').contains(&c)
        || ('\u{2800}'..='\u{28FF}').contains(&c)
}

/// True for lines that are pure decoration: only border/block characters
/// (ignoring whitespace), or more than [`BLOCK_GLYPH_THRESHOLD`] block glyphs.
pub fn is_banner_line(line: &str) -> bool {
    let mut art = 0usize;
    let mut blocks = 0usize;
    let mut other = 0usize;

    for c in line.chars() {
        if c.is_whitespace() {
            continue;
        }
        if is_block_glyph(c) {
            blocks += 1;
            art += 1;
        } else if is_border_char(c) {
            art += 1;
        } else {
            other += 1;
        }
    }

    (art > 0 && other == 0) || blocks > BLOCK_GLYPH_THRESHOLD
}

fn drop_banner_lines(text: &str) -> String {
    text.split('\n')
        .filter(|line| !is_banner_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Clean captured output for display and parsing.
///
/// Leading and trailing whitespace is trimmed. Banner detection ignores
/// whitespace, so trimming never changes which lines survive a second pass.
pub fn sanitize(raw: &str) -> String {
    let stripped = strip_control_sequences(raw);
    drop_banner_lines(&stripped).trim().to_string()
}

// ---------------------------------------------------------------------------
// Version extraction
// ---------------------------------------------------------------------------

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
    VERSION_RE.get_or_init(|| {
        Regex::new(r"\b(\d+\.\d+\.\d+(?:-[0-9A-Za-z.]+)?(?:\+[0-9A-Za-z.]+)?)").unwrap()
    })
}

/// Find the first semver-like token in already-sanitized text.
pub fn parse_version(text: &str) -> Option<String> {
    version_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LOGO: &str = concat!(
        "███████╗██████╗ ███████╗ ██████╗██╗███████╗██╗   ██╗\n",
        "██╔════╝██╔══██╗██╔════╝██╔════╝██║██╔════╝╚██╗ ██╔╝\n",
        "███████╗██████╔╝█████╗  ██║     ██║█████╗   ╚████╔╝ \n",
        "╚══════╝╚═╝     ╚══════╝ ╚═════╝╚═╝╚═╝        ╚═╝   \n",
    );

    #[test]
    fn strips_sgr_and_cursor_sequences() {
        let raw = "\x1b[1;32mok\x1b[0m \x1b[2K\x1b[1Gdone";
        assert_eq!(sanitize(raw), "ok done");
    }

    #[test]
    fn strips_osc_hyperlinks() {
        let raw = "see \x1b]8;;https://example.com\x07docs\x1b]8;;\x07 now";
        assert_eq!(sanitize(raw), "see docs now");
        let st = "\x1b]0;title\x1b\\body";
        assert_eq!(sanitize(st), "body");
    }

    #[test]
    fn strips_dcs_and_two_byte_escapes() {
        assert_eq!(sanitize("a\x1bPq#0;1\x1b\\b"), "ab");
        assert_eq!(sanitize("\x1b7saved\x1b8"), "saved");
        assert_eq!(sanitize("\x1b(Bplain"), "plain");
    }

    #[test]
    fn keeps_tabs_and_newlines_but_drops_other_controls() {
        assert_eq!(sanitize("a\tb\nc\x07\x08d\x00"), "a\tb\ncd");
    }

    #[test]
    fn drops_block_letter_logo() {
        let out = sanitize(&format!("{LOGO}\nSpecify CLI ready\n"));
        assert_eq!(out, "Specify CLI ready");
    }

    #[test]
    fn drops_pure_border_lines_but_keeps_framed_text() {
        let raw = "╭──────────────╮\n│ Project ok   │\n╰──────────────╯";
        assert_eq!(sanitize(raw), "│ Project ok   │");
    }

    #[test]
    fn keeps_lines_with_few_block_glyphs() {
        let raw = "progress █████ 50%";
        assert_eq!(sanitize(raw), raw);
        assert!(is_banner_line("progress ██████ 60%"));
    }

    #[test]
    fn whitespace_only_lines_are_not_banners() {
        assert!(!is_banner_line("   "));
        assert!(!is_banner_line(""));
    }

    #[test]
    fn version_output_with_banner_yields_semver() {
        let raw = format!("\x1b[36m{LOGO}\x1b[0m\n\x1b[1mSpecify CLI\x1b[0m\n\x1b[32m1.2.3\x1b[0m\n");
        let clean = sanitize(&raw);
        assert!(clean.lines().any(|l| l == "1.2.3"), "got: {clean:?}");
        assert_eq!(parse_version(&clean).as_deref(), Some("1.2.3"));
    }

    #[test]
    fn parse_version_handles_prerelease_and_absence() {
        assert_eq!(
            parse_version("specify-cli 0.0.20-rc.1").as_deref(),
            Some("0.0.20-rc.1")
        );
        assert_eq!(parse_version("no version here"), None);
    }

    #[test]
    fn sanitize_is_idempotent_on_fixtures() {
        let fixtures = [
            String::new(),
            "plain".to_string(),
            "\x1b\x1b[31mnested\x1b".to_string(),
            "\x1b\x00[31mjoined".to_string(),
            format!("  \n{LOGO}  text  \n\n"),
            "╭──╮\n  ██████ \n│x│\r\n\t\x1b]8;;u\x07link\x1b]8;;\x07".to_string(),
            "\u{9b}31mc1\u{85}next".to_string(),
            "a\r\nb\r\n".to_string(),
        ];
        for raw in &fixtures {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn sanitize_is_idempotent_on_generated_inputs() {
        // Deterministic pseudo-random mix of escapes, art and text.
        let pieces = [
            "\x1b[", "31m", "\x1b]", "\x07", "\x1b\\", "█", "─", "│", "text", " ", "\n", "\r",
            "\t", "1.2.3", "\x1b", "\x00", "[", "m", "\u{9b}", "P",
        ];
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            let mut s = String::new();
            for _ in 0..24 {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                s.push_str(pieces[(seed % pieces.len() as u64) as usize]);
            }
            let once = sanitize(&s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }
}
