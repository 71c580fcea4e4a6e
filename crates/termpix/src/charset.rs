//! Glyph ramps and the brightness-to-glyph projection.

/// Ramp used when no charset (or an empty one) is given.
pub const DEFAULT_CHARSET: &str = " .:-=+*#%@";

/// Named ramps, each ordered dark to light.
#[rustfmt::skip]
const CHARSETS: &[(&str, &str)] = &[
    ("standard", DEFAULT_CHARSET),
    ("simple", " .*#"),
    ("binary", " █"),
    ("ascii", " .,:;i1tfLCG08@"),
    ("detailed", " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$"),
    ("blocks", " ░▒▓█"),
    ("shade", " ░▒▓█▄▀▌▐"),
    ("braille", BRAILLE),
    ("box", " ─│┌┐└┘├┤┬┴┼━┃┏┓┗┛┣┫┳┻╋╔╗╚╝╠╣╦╩╬░▒▓█"),
    ("geometric", " ◦◌○◎●◐◑◒◓◔◕◖◗◘◙◚◛◜◝◞◟◠◡◢◣◤◥◦◧◨◩◪◫◬◭◮◯"),
    ("shapes", " ·∘○◌◎●◐◑▪▫◻◼◽◾▢▣▤▥▦▧▨▩■□▬▭▮▯"),
    ("math", " ·∙∘∴∵∶∷∸∹∺∻∼∽∾∿≀≁≂≃≄≅≆≇≈≉≊≋≌≍≎≏≐≑≒≓≔≕≖≗≘≙≚≛≜≝≞≟≠≡≢≣≤≥"),
    ("stars", " ·✦✧★☆✡✢✣✤✥✦✧✩✪✫✬✭✮✯✰✱✲✳✴✵✶✷✸✹✺✻✼✽✾✿❀❁❂❃❄❅❆❇❈❉❊❋"),
    ("dingbats", " ·•‣⁃⁌⁍∎∗※⁂⁎⁑⁕❖❗❘❙❚❛❜❝❞❟❠❡❢❣❤❥❦❧"),
    ("arrows", " →↗↑↖←↙↓↘↔↕↯⇐⇑⇒⇓⇔⇕⇖⇗⇘⇙⇚⇛⇜⇝⇞⇟⇠⇡⇢⇣⇤⇥⇦⇧⇨⇩⇪"),
    ("music", " ♩♪♫♬♭♮♯𝄞𝄢𝄪𝄫"),
    ("symbols", " ·‥…※†‡•‣⁂⁃⁎⁑⁕♠♡♢♣♤♥♦♧♨♩♪♫♬☀☁☂☃☄★☆☇☈☉☊☋☌☍☎☏"),
    ("ultra", " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$░▒▓█▀▄▌▐●○◐◑◒◓■□▪▫◻◼★☆✦✧"),
    ("retro", " ·:;+*%#@█▓▒░"),
    ("dots", " ·∘○◌◎●"),
    ("elegant", " ·‥…∴∵∶∷⁘⁙⁚⁛⁜⁝⁞"),
    ("dense", " 一二三亖卅卌╳╬╫╪╩╨╧╦╥╤╣╢╡╠╟╞╝╜╛╚╙╘╗╖╕╔╓╒║═"),
    ("hatch", " /\\|─│┌┐└┘├┤┬┴┼╱╲╳"),
    ("stipple", " ⠀⠁⠂⠄⠈⠐⠠⡀⢀⣀⣠⣤⣴⣶⣷⣿"),
    ("dots_braille", BRAILLE),
];

#[rustfmt::skip]
const BRAILLE: &str = " ⠁⠂⠃⠄⠅⠆⠇⡀⡁⡂⡃⡄⡅⡆⡇⠈⠉⠊⠋⠌⠍⠎⠏⡈⡉⡊⡋⡌⡍⡎⡏⠐⠑⠒⠓⠔⠕⠖⠗⡐⡑⡒⡓⡔⡕⡖⡗⠘⠙⠚⠛⠜⠝⠞⠟⡘⡙⡚⡛⡜⡝⡞⡟⠠⠡⠢⠣⠤⠥⠦⠧⡠⡡⡢⡣⡤⡥⡦⡧⠨⠩⠪⠫⠬⠭⠮⠯⡨⡩⡪⡫⡬⡭⡮⡯⠰⠱⠲⠳⠴⠵⠶⠷⡰⡱⡲⡳⡴⡵⡶⡷⠸⠹⠺⠻⠼⠽⠾⠿⡸⡹⡺⡻⡼⡽⡾⡿⢀⢁⢂⢃⢄⢅⢆⢇⣀⣁⣂⣃⣄⣅⣆⣇⢈⢉⢊⢋⢌⢍⢎⢏⣈⣉⣊⣋⣌⣍⣎⣏⢐⢑⢒⢓⢔⢕⢖⢗⣐⣑⣒⣓⣔⣕⣖⣗⢘⢙⢚⢛⢜⢝⢞⢟⣘⣙⣚⣛⣜⣝⣞⣟⢠⢡⢢⢣⢤⢥⢦⢧⣠⣡⣢⣣⣤⣥⣦⣧⢨⢩⢪⢫⢬⢭⢮⢯⣨⣩⣪⣫⣬⣭⣮⣯⢰⢱⢲⢳⢴⢵⢶⢷⣰⣱⣲⣳⣴⣵⣶⣷⢸⢹⢺⢻⢼⢽⢾⢿⣸⣹⣺⣻⣼⣽⣾⣿";

/// Look up a ramp by name. Unknown names fall back to `standard`.
pub fn charset(name: &str) -> &'static str {
    CHARSETS
        .iter()
        .find(|(n, _)| *n == name)
        .map_or(DEFAULT_CHARSET, |(_, ramp)| ramp)
}

/// Names accepted by [`charset`], in display order.
pub fn charset_names() -> &'static [&'static str] {
    &[
        "standard", "simple", "ascii", "detailed", "binary", "blocks", "shade", "braille",
        "stipple", "box", "hatch", "geometric", "shapes", "dots", "stars", "dingbats", "symbols",
        "arrows", "music", "math", "elegant", "dense", "ultra", "retro",
    ]
}

/// An ordered, non-empty glyph ramp (dark to light).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ramp {
    glyphs: Vec<char>,
}

impl Ramp {
    /// Build a ramp from a string. An empty string yields the default ramp.
    pub fn new(chars: &str) -> Self {
        let chars = if chars.is_empty() {
            DEFAULT_CHARSET
        } else {
            chars
        };
        Self {
            glyphs: chars.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Never true: an empty charset falls back to the default ramp.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyph index for a brightness in `[0, 1]`: `round(b * (len - 1))`,
    /// clamped to the ramp. With `invert`, `1 - b` is projected instead.
    #[inline]
    pub fn index(&self, brightness: f64, invert: bool) -> usize {
        let b = if invert { 1.0 - brightness } else { brightness };
        let last = self.glyphs.len() - 1;
        let idx = (b * last as f64).round();
        if idx.is_nan() || idx <= 0.0 {
            0
        } else {
            (idx as usize).min(last)
        }
    }

    #[inline]
    pub fn glyph(&self, brightness: f64, invert: bool) -> char {
        self.glyphs[self.index(brightness, invert)]
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(DEFAULT_CHARSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lookup_and_fallback() {
        assert_eq!(charset("blocks"), " ░▒▓█");
        assert_eq!(charset("standard"), DEFAULT_CHARSET);
        assert_eq!(charset("no-such-ramp"), DEFAULT_CHARSET);
    }

    #[test]
    fn test_every_listed_name_resolves() {
        for name in charset_names() {
            assert!(
                CHARSETS.iter().any(|(n, _)| n == name),
                "{name} missing from table"
            );
        }
    }

    #[test]
    fn test_empty_ramp_uses_default() {
        assert_eq!(Ramp::new(""), Ramp::default());
        assert_eq!(Ramp::new("").len(), 10);
    }

    #[test]
    fn test_projection_endpoints() {
        let ramp = Ramp::new(DEFAULT_CHARSET);
        assert_eq!(ramp.glyph(0.0, false), ' ');
        assert_eq!(ramp.glyph(1.0, false), '@');
        assert_eq!(ramp.glyph(0.0, true), '@');
        assert_eq!(ramp.glyph(1.0, true), ' ');
        // 0.5 * 9 = 4.5 rounds away from zero
        assert_eq!(ramp.index(0.5, false), 5);
    }

    #[test]
    fn test_projection_clamps_out_of_range() {
        let ramp = Ramp::new(" #");
        assert_eq!(ramp.index(-3.0, false), 0);
        assert_eq!(ramp.index(7.5, false), 1);
        assert_eq!(ramp.index(f64::NAN, false), 0);
    }

    #[test]
    fn test_single_glyph_ramp() {
        let ramp = Ramp::new("x");
        assert_eq!(ramp.glyph(0.0, false), 'x');
        assert_eq!(ramp.glyph(1.0, false), 'x');
    }

    proptest! {
        #[test]
        fn prop_projection_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0, name_idx in 0usize..24) {
            let ramp = Ramp::new(charset(charset_names()[name_idx]));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ramp.index(lo, false) <= ramp.index(hi, false));
            prop_assert!(ramp.index(lo, true) >= ramp.index(hi, true));
        }
    }
}
