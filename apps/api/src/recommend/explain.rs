//! Explanation generator: a short human-readable rationale per recommendation.
//!
//! Wording varies between fixed templates. The variant is picked through a
//! [`PhraseChooser`], random in production and fixed in tests. Explanations
//! only read a finished [`ScoredJob`], so the choice can never change scores,
//! fit levels, skill sets or ranking.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::recommend::matching::{
    has_keyword, ScoredJob, UserProfile, EDUCATION_KEYWORDS, EXPERIENCE_KEYWORDS,
};
use crate::recommend::normalize::normalize;
use crate::recommend::query::JobSkill;

/// Matched skills named in the narration.
const NARRATED_MATCHED: usize = 5;
/// Missing skills suggested for learning.
const NARRATED_MISSING: usize = 3;

/// Words that mark a skill label as a product or tool name rather than a
/// skill. Such labels are left out of the narration only.
const TOOL_WORDS: &[&str] = &[
    "app",
    "tool",
    "product",
    "system",
    "application",
    "platform",
    "package",
];

// ────────────────────────────────────────────────────────────────────────────
// Language
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "id")]
    Indonesian,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "id" | "indonesian" | "bahasa" => Ok(Language::Indonesian),
            other => Err(format!("unsupported language '{other}' (expected en|id)")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => f.write_str("en"),
            Language::Indonesian => f.write_str("id"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Phrase choice
// ────────────────────────────────────────────────────────────────────────────

/// Picks one of `options` phrasings. Must return an index below `options`.
pub trait PhraseChooser {
    fn choose(&mut self, options: usize) -> usize;
}

/// Production chooser.
pub struct RandomPhrase(StdRng);

impl RandomPhrase {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomPhrase {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseChooser for RandomPhrase {
    fn choose(&mut self, options: usize) -> usize {
        if options <= 1 {
            return 0;
        }
        self.0.gen_range(0..options)
    }
}

/// Always picks the same variant (wrapped into range).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPhrase(pub usize);

impl PhraseChooser for FixedPhrase {
    fn choose(&mut self, options: usize) -> usize {
        if options == 0 {
            0
        } else {
            self.0 % options
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Templates
// ────────────────────────────────────────────────────────────────────────────

type Variants = &'static [&'static str];

/// Placeholders: `{title}`, `{percent}`, `{fit}`, `{skills}`, `{missing}`,
/// `{field}`.
struct Phrasebook {
    opening_high: Variants,
    opening_moderate: Variants,
    opening_low: Variants,
    matched_grouped: Variants,
    matched_plain: Variants,
    matched_vague: Variants,
    missing: Variants,
    complete: Variants,
    education_relevant: Variants,
    education_different: Variants,
    education_neutral: Variants,
    experience_relevant: Variants,
    experience_different: Variants,
    experience_neutral: Variants,
    such_as: &'static str,
}

const ENGLISH: Phrasebook = Phrasebook {
    opening_high: &[
        "{title} looks like a strong fit for you ({percent}% match, {fit}).",
        "You are well positioned for {title} with a {percent}% skill match.",
        "{title} lines up closely with what you already know ({fit}, {percent}%).",
    ],
    opening_moderate: &[
        "{title} is a reasonable fit ({percent}% match, {fit}).",
        "You cover a fair part of what {title} asks for ({percent}%).",
    ],
    opening_low: &[
        "{title} is a stretch for now ({percent}% match, {fit}), but it is within reach.",
        "Your profile only partly covers {title} ({percent}%), which gives you a clear learning path.",
    ],
    matched_grouped: &[
        "Your background in {skills} carries over directly to this role.",
        "You bring a solid base in {skills}, which this position relies on.",
        "Your strengths in {skills} match what the employer is looking for.",
    ],
    matched_plain: &[
        "Your skills in {skills} match this job's requirements.",
        "This job asks for {skills}, which you already have.",
    ],
    matched_vague: &[
        "Some of your skills are relevant to this role, though not in depth yet.",
        "There is some overlap between your skills and this position.",
    ],
    missing: &[
        "To strengthen your application, consider learning {missing}.",
        "Picking up {missing} would close most of the remaining gap.",
        "Spending some time on {missing} would make you a better match.",
    ],
    complete: &[
        "You already cover every skill this job lists.",
        "No listed skill is missing from your profile.",
    ],
    education_relevant: &[
        "Your education is closely related to technology work.",
        "Your studies give you a solid theoretical foundation for this position.",
    ],
    education_different: &[
        "Your education ({field}) is from a different field, which can be a distinctive asset once combined with technical training.",
        "Although your field of study ({field}) differs, your ability to adapt can still set you apart.",
    ],
    education_neutral: &[
        "Your education ({field}) brings an interesting perspective to this role.",
        "Your field of study ({field}) may not be directly related, but it still adds value.",
    ],
    experience_relevant: &[
        "Your work experience is already aligned with the challenges of this position.",
        "Your experience suggests you are used to a similar working environment.",
    ],
    experience_different: &[
        "Your experience ({field}) has little overlap with this field so far, but it is a good starting point.",
        "Your experience ({field}) sits outside this field, yet it still brings analytical and organisational value.",
    ],
    experience_neutral: &[
        "Your experience ({field}) gives you a relevant working base for this role.",
        "Even if not fully aligned, your experience ({field}) can enrich how you approach this job.",
    ],
    such_as: "such as",
};

const INDONESIAN: Phrasebook = Phrasebook {
    opening_high: &[
        "{title} sangat sesuai untukmu ({percent}% kecocokan, {fit}).",
        "Profilmu sudah kuat untuk posisi {title} dengan kecocokan skill {percent}%.",
        "Posisi {title} selaras dengan kemampuanmu saat ini ({fit}, {percent}%).",
    ],
    opening_moderate: &[
        "{title} cukup sesuai untukmu ({percent}% kecocokan, {fit}).",
        "Kamu sudah memenuhi sebagian kebutuhan posisi {title} ({percent}%).",
    ],
    opening_low: &[
        "{title} masih cukup jauh untuk saat ini ({percent}% kecocokan, {fit}), tapi tetap bisa dicapai.",
        "Profilmu baru sebagian memenuhi posisi {title} ({percent}%), sehingga arah belajarmu jelas.",
    ],
    matched_grouped: &[
        "Kemampuanmu di bidang {skills} langsung relevan untuk peran ini.",
        "Kamu punya dasar yang kuat di {skills}, yang dibutuhkan posisi ini.",
        "Keunggulanmu di {skills} sesuai dengan yang dicari perusahaan.",
    ],
    matched_plain: &[
        "Skill {skills} yang kamu miliki sesuai dengan kebutuhan pekerjaan ini.",
        "Pekerjaan ini membutuhkan {skills}, dan kamu sudah menguasainya.",
    ],
    matched_vague: &[
        "Beberapa skill-mu relevan dengan posisi ini, walau belum mendalam.",
        "Ada sedikit kecocokan antara skill-mu dan kebutuhan posisi ini.",
    ],
    missing: &[
        "Untuk memperkuat lamaranmu, coba pelajari {missing}.",
        "Menguasai {missing} akan menutup sebagian besar kekurangan yang ada.",
        "Mendalami {missing} akan membuatmu semakin cocok dengan posisi ini.",
    ],
    complete: &[
        "Kamu sudah menguasai semua skill yang dibutuhkan pekerjaan ini.",
        "Tidak ada skill yang dibutuhkan yang belum kamu miliki.",
    ],
    education_relevant: &[
        "Latar belakang pendidikanmu sangat relevan dengan bidang teknologi.",
        "Pendidikanmu memberi fondasi teori yang kuat untuk posisi ini.",
    ],
    education_different: &[
        "Pendidikanmu ({field}) berasal dari bidang lain, tapi bisa jadi nilai tambah bila digabung dengan pelatihan teknis.",
        "Walau bidang studimu ({field}) berbeda, kemampuan beradaptasimu tetap bisa menjadi keunggulan.",
    ],
    education_neutral: &[
        "Pendidikanmu ({field}) memberi sudut pandang menarik untuk posisi ini.",
        "Bidang studimu ({field}) mungkin tidak langsung terkait, namun tetap memberi nilai positif.",
    ],
    experience_relevant: &[
        "Pengalaman kerjamu sudah searah dengan tantangan di posisi ini.",
        "Dari sisi pengalaman, kamu tampak terbiasa dengan lingkungan kerja serupa.",
    ],
    experience_different: &[
        "Pengalamanmu ({field}) belum banyak bersinggungan dengan bidang ini, tapi bisa jadi titik awal.",
        "Pengalamanmu ({field}) masih di luar bidang ini, namun tetap memberi nilai dalam hal analisis dan pengelolaan.",
    ],
    experience_neutral: &[
        "Pengalamanmu ({field}) memberi dasar kerja yang relevan untuk posisi ini.",
        "Walau tidak sepenuhnya sejalan, pengalamanmu ({field}) bisa memperkaya caramu bekerja di posisi ini.",
    ],
    such_as: "seperti",
};

impl Phrasebook {
    fn for_language(language: Language) -> &'static Phrasebook {
        match language {
            Language::English => &ENGLISH,
            Language::Indonesian => &INDONESIAN,
        }
    }
}

fn pick(variants: Variants, chooser: &mut dyn PhraseChooser) -> &'static str {
    let idx = chooser.choose(variants.len());
    variants.get(idx).or(variants.first()).copied().unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Explanation
// ────────────────────────────────────────────────────────────────────────────

/// Builds the rationale for one scored job.
pub fn explain(
    scored: &ScoredJob,
    profile: &UserProfile,
    language: Language,
    chooser: &mut dyn PhraseChooser,
) -> String {
    let book = Phrasebook::for_language(language);
    let fit = scored.fit_level;
    let mut parts = Vec::new();

    let opening = if fit.is_high() {
        book.opening_high
    } else if fit.is_low() {
        book.opening_low
    } else {
        book.opening_moderate
    };
    parts.push(
        pick(opening, chooser)
            .replace("{title}", &scored.job.title)
            .replace("{percent}", &format!("{:.1}", scored.match_percent))
            .replace("{fit}", fit.label(language)),
    );

    let matched: Vec<&JobSkill> = scored
        .matched
        .iter()
        .map(|m| &m.skill)
        .filter(|s| is_narratable(&s.label))
        .take(NARRATED_MATCHED)
        .collect();
    parts.push(if matched.is_empty() {
        pick(book.matched_vague, chooser).to_string()
    } else if matched.iter().any(|s| s.category.is_some()) {
        pick(book.matched_grouped, chooser).replace("{skills}", &group_by_category(&matched, book))
    } else {
        pick(book.matched_plain, chooser).replace("{skills}", &join_labels(&matched))
    });

    if scored.missing.is_empty() {
        parts.push(pick(book.complete, chooser).to_string());
    } else {
        let missing: Vec<&JobSkill> = scored
            .missing
            .iter()
            .filter(|s| is_narratable(&s.label))
            .take(NARRATED_MISSING)
            .collect();
        if !missing.is_empty() {
            parts.push(pick(book.missing, chooser).replace("{missing}", &join_labels(&missing)));
        }
    }

    if let Some(education) = &profile.education {
        let variants = if has_keyword(&normalize(education), EDUCATION_KEYWORDS) {
            book.education_relevant
        } else if fit.is_low() {
            book.education_different
        } else {
            book.education_neutral
        };
        parts.push(pick(variants, chooser).replace("{field}", education));
    }

    if let Some(experience) = &profile.experience {
        let variants = if has_keyword(&normalize(experience), EXPERIENCE_KEYWORDS) {
            book.experience_relevant
        } else if fit.is_low() {
            book.experience_different
        } else {
            book.experience_neutral
        };
        parts.push(pick(variants, chooser).replace("{field}", experience));
    }

    parts.join(" ")
}

/// False for labels that read like product or tool names ("Slack App").
/// Tool words must be whole tokens, so "WhatsApp" stays narratable.
pub fn is_narratable(label: &str) -> bool {
    let normalized = normalize(label);
    !normalized.is_empty()
        && !normalized
            .split(' ')
            .any(|t| TOOL_WORDS.contains(&t.trim_end_matches('s')))
}

fn join_labels(skills: &[&JobSkill]) -> String {
    skills
        .iter()
        .map(|s| s.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// "programming such as python, r; data management such as sql". Categories
/// keep first-seen order; uncategorized skills are listed last on their own.
fn group_by_category(skills: &[&JobSkill], book: &Phrasebook) -> String {
    let mut groups: Vec<(&str, Vec<&JobSkill>)> = Vec::new();
    let mut loose = Vec::new();
    for skill in skills {
        match skill.category.as_deref() {
            Some(category) => match groups.iter_mut().find(|(c, _)| *c == category) {
                Some((_, members)) => members.push(*skill),
                None => groups.push((category, vec![*skill])),
            },
            None => loose.push(*skill),
        }
    }

    let mut rendered: Vec<String> = groups
        .iter()
        .map(|(category, members)| {
            format!(
                "{} {} {}",
                category.to_lowercase(),
                book.such_as,
                join_labels(members)
            )
        })
        .collect();
    if !loose.is_empty() {
        rendered.push(join_labels(&loose));
    }
    rendered.join("; ")
}
