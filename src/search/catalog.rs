//! Static reference data: what each mode may search, which texts a user can
//! pick, the explorable themes, and stored facts for when the model is down.

use crate::models::SearchMode;

/// How a mode shapes the prompts it is used in.
#[derive(Debug, Clone, Copy)]
pub struct ModeProfile {
    pub mode: SearchMode,
    /// The "no specific source" entry shown first in the source picker
    pub sentinel: &'static str,
    /// Who the model should act as
    pub persona: &'static str,
    /// Eligible category of texts, phrased to follow "from"
    pub category: &'static str,
    /// Well-known texts in the category, used only for unconstrained searches
    pub examples: &'static str,
    /// Texts that must never be used in this mode (empty for none)
    pub exclusions: &'static str,
    pub sources: &'static [&'static str],
}

const RELIGIOUS_SOURCES: &[&str] = &[
    "Bible (Old & New Testament)",
    "Quran",
    "Hadith (Sahih al-Bukhari, Sahih Muslim)",
    "Tanakh (Hebrew Bible)",
    "Talmud",
    "Mishnah",
    "Bhagavad Gita",
    "Upanishads",
    "Vedas",
    "Ramayana",
    "Mahabharata",
    "Dhammapada",
    "Pali Canon (Tipitaka)",
    "Mahayana Sutras",
    "Guru Granth Sahib",
    "Agamas",
    "Tattvartha Sutra",
    "Kojiki",
    "Nihon Shoki",
    "Writings of Bahá'u'lláh",
    "Avesta",
    "Popol Vuh (Maya)",
];

const SPIRITUAL_SOURCES: &[&str] = &[
    "Tao Te Ching",
    "Zhuangzi",
    "Works of Rumi",
    "Works of Kabir",
    "Meditations (Marcus Aurelius)",
    "Enchiridion (Epictetus)",
    "Letters of Seneca",
    "The Prophet (Kahlil Gibran)",
    "The Cloud of Unknowing",
    "Works of Thich Nhat Hanh",
];

const NON_RELIGIOUS_SOURCES: &[&str] = &[
    "Works of Plato",
    "Works of Aristotle",
    "Analects (Confucius)",
    "Works of Immanuel Kant",
    "Works of David Hume",
    "Ethics (Baruch Spinoza)",
    "On Liberty (John Stuart Mill)",
    "Works of Bertrand Russell",
    "Works of Friedrich Nietzsche",
    "On the Origin of Species (Charles Darwin)",
    "Works of Carl Sagan",
];

const UNIVERSALIST_SOURCES: &[&str] = &[
    "Bible (Old & New Testament)",
    "Quran",
    "Tanakh (Hebrew Bible)",
    "Talmud",
    "Bhagavad Gita",
    "Upanishads",
    "Dhammapada",
    "Guru Granth Sahib",
    "Tao Te Ching",
    "Zhuangzi",
    "Works of Rumi",
    "Meditations (Marcus Aurelius)",
    "Analects (Confucius)",
    "Works of Plato",
    "Works of Aristotle",
    "Works of Immanuel Kant",
    "Works of Bertrand Russell",
];

const PROFILES: [ModeProfile; 4] = [
    ModeProfile {
        mode: SearchMode::Religious,
        sentinel: "Default (All Religious Texts)",
        persona: "an expert theological research assistant",
        category: "sacred scripture and theological writings considered authoritative \
                   within established religious traditions",
        examples: "Bible, Qur'an, Vedas, Talmud",
        exclusions: "secular philosophy, self-help writing, or mystical texts outside an \
                     established religious canon",
        sources: RELIGIOUS_SOURCES,
    },
    ModeProfile {
        mode: SearchMode::Spiritual,
        sentinel: "Default (All Spiritual Texts)",
        persona: "an expert philosophical research assistant",
        category: "mystical, meditative, or reflective texts focused on inner discovery",
        examples: "Rumi, Tao Te Ching, Stoic philosophy",
        exclusions: "dogmatic religious scripture such as the Bible, Qur'an, or Talmud",
        sources: SPIRITUAL_SOURCES,
    },
    ModeProfile {
        mode: SearchMode::NonReligious,
        sentinel: "Default (All Non-Religious Texts)",
        persona: "an expert philosophical research assistant",
        category: "philosophical treatises, scientific works, and humanist writings",
        examples: "Aristotle, Kant, Bertrand Russell",
        exclusions: "any religious or scriptural text",
        sources: NON_RELIGIOUS_SOURCES,
    },
    ModeProfile {
        mode: SearchMode::Universalist,
        sentinel: "Default (All Texts)",
        persona: "an expert in comparative religion and philosophy",
        category: "any text: religious, spiritual, or non-religious",
        examples: "Bible, Dhammapada, Tao Te Ching, Meditations, Plato",
        exclusions: "",
        sources: UNIVERSALIST_SOURCES,
    },
];

pub fn profile(mode: SearchMode) -> &'static ModeProfile {
    match mode {
        SearchMode::Religious => &PROFILES[0],
        SearchMode::Spiritual => &PROFILES[1],
        SearchMode::NonReligious => &PROFILES[2],
        SearchMode::Universalist => &PROFILES[3],
    }
}

/// Sources for the picker, sentinel first.
pub fn source_options(mode: SearchMode) -> Vec<&'static str> {
    let profile = profile(mode);
    std::iter::once(profile.sentinel)
        .chain(profile.sources.iter().copied())
        .collect()
}

pub const THEMES: [&str; 6] = ["Compassion", "Justice", "Love", "Wisdom", "Peace", "Humility"];

/// Theme exploration searches broadly, so it uses the Spiritual mode.
pub const THEME_MODE: SearchMode = SearchMode::Spiritual;

pub fn find_theme(name: &str) -> Option<&'static str> {
    let name = name.trim();
    THEMES.into_iter().find(|t| t.eq_ignore_ascii_case(name))
}

pub const FALLBACK_FACTS: [&str; 13] = [
    "The Golden Rule, 'Do unto others as you would have them do unto you,' appears in some form in nearly every major religion and ethical system.",
    "Buddhism is non-theistic in its core teachings, focusing on the nature of suffering and the path to enlightenment rather than the worship of a creator god.",
    "In Islam, the Quran is considered the literal word of God as revealed to the Prophet Muhammad through the angel Gabriel.",
    "Hinduism is often considered the world's oldest living religion, with roots and customs dating back more than 4,000 years.",
    "The concept of 'Tao' in Taoism is often translated as 'the Way' or 'the Path,' representing the fundamental, ineffable nature of the universe.",
    "Judaism follows a lunar calendar, which is why the dates of its holidays, like Hanukkah and Passover, change each year in the Gregorian calendar.",
    "Stoicism, an ancient Greek and Roman philosophy, teaches that virtue is the only good and that external events are beyond our control.",
    "The Sikh faith originated in the Punjab region of India in the 15th century and emphasizes the equality of all humankind.",
    "In many indigenous African religions, ancestors are venerated as intermediaries between the living and the divine.",
    "Jainism, an ancient religion from India, has a central tenet of 'Ahimsa,' or non-violence towards all living beings, which is why many Jains are strict vegetarians or vegans.",
    "The term 'Shinto' in Japan means 'the way of the gods,' and its practices focus on the veneration of kami, or divine spirits.",
    "The Baháʼí Faith, founded in the 19th century, teaches the essential worth of all religions and the unity of all people.",
    "Zoroastrianism, one of the world's oldest continuously practiced religions, originated in ancient Persia and centers on a dualistic cosmology of good and evil.",
];
