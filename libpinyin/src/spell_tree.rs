//! Pinyin syllables split into the three levels entered by gestures.
//!
//! A slip starts on the initial (level 0), crosses the first letter of the
//! final (level 1) and may end on the rest of the final (level 2). The
//! `SpellTree` answers which continuations exist at each step.

use libcompose_core::dict::split_spell;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// All standard pinyin syllables (without tone markers).
pub const PINYIN_SYLLABLES: &[&str] = &[
    "a", "ai", "an", "ang", "ao", "ba", "bai", "ban", "bang", "bao", "bei", "ben", "beng", "bi",
    "bian", "biao", "bie", "bin", "bing", "bo", "bu", "ca", "cai", "can", "cang", "cao", "ce",
    "cen", "ceng", "cha", "chai", "chan", "chang", "chao", "che", "chen", "cheng", "chi", "chong",
    "chou", "chu", "chuai", "chuan", "chuang", "chui", "chun", "chuo", "ci", "cong", "cou", "cu",
    "cuan", "cui", "cun", "cuo", "da", "dai", "dan", "dang", "dao", "de", "dei", "deng", "di",
    "dia", "dian", "diao", "die", "ding", "diu", "dong", "dou", "du", "duan", "dui", "dun", "duo",
    "e", "ei", "en", "er", "fa", "fan", "fang", "fei", "fen", "feng", "fo", "fou", "fu", "ga",
    "gai", "gan", "gang", "gao", "ge", "gei", "gen", "geng", "gong", "gou", "gu", "gua", "guai",
    "guan", "guang", "gui", "gun", "guo", "ha", "hai", "han", "hang", "hao", "he", "hei", "hen",
    "heng", "hong", "hou", "hu", "hua", "huai", "huan", "huang", "hui", "hun", "huo", "ji", "jia",
    "jian", "jiang", "jiao", "jie", "jin", "jing", "jiong", "jiu", "ju", "juan", "jue", "jun",
    "ka", "kai", "kan", "kang", "kao", "ke", "ken", "keng", "kong", "kou", "ku", "kua", "kuai",
    "kuan", "kuang", "kui", "kun", "kuo", "la", "lai", "lan", "lang", "lao", "le", "lei", "leng",
    "li", "lia", "lian", "liang", "liao", "lie", "lin", "ling", "liu", "lo", "long", "lou", "lu",
    "luan", "lun", "luo", "lv", "lve", "ma", "mai", "man", "mang", "mao", "me", "mei", "men",
    "meng", "mi", "mian", "miao", "mie", "min", "ming", "miu", "mo", "mou", "mu", "na", "nai",
    "nan", "nang", "nao", "ne", "nei", "nen", "neng", "ng", "ni", "nian", "niang", "niao", "nie",
    "nin", "ning", "niu", "nong", "nou", "nu", "nuan", "nuo", "nv", "nve", "o", "ou", "pa", "pai",
    "pan", "pang", "pao", "pei", "pen", "peng", "pi", "pian", "piao", "pie", "pin", "ping", "po",
    "pou", "pu", "qi", "qia", "qian", "qiang", "qiao", "qie", "qin", "qing", "qiong", "qiu", "qu",
    "quan", "que", "qun", "ran", "rang", "rao", "re", "ren", "reng", "ri", "rong", "rou", "ru",
    "ruan", "rui", "run", "ruo", "sa", "sai", "san", "sang", "sao", "se", "sen", "seng", "sha",
    "shai", "shan", "shang", "shao", "she", "shei", "shen", "sheng", "shi", "shou", "shu", "shua",
    "shuai", "shuan", "shuang", "shui", "shun", "shuo", "si", "song", "sou", "su", "suan", "sui",
    "sun", "suo", "ta", "tai", "tan", "tang", "tao", "te", "teng", "ti", "tian", "tiao", "tie",
    "ting", "tong", "tou", "tu", "tuan", "tui", "tun", "tuo", "wa", "wai", "wan", "wang", "wei",
    "wen", "weng", "wo", "wu", "xi", "xia", "xian", "xiang", "xiao", "xie", "xin", "xing", "xiong",
    "xiu", "xu", "xuan", "xue", "xun", "ya", "yan", "yang", "yao", "ye", "yi", "yin", "ying", "yo",
    "yong", "you", "yu", "yuan", "yue", "yun", "za", "zai", "zan", "zang", "zao", "ze", "zei",
    "zen", "zeng", "zha", "zhai", "zhan", "zhang", "zhao", "zhe", "zhen", "zheng", "zhi", "zhong",
    "zhou", "zhu", "zhua", "zhuai", "zhuan", "zhuang", "zhui", "zhun", "zhuo", "zi", "zong", "zou",
    "zu", "zuan", "zui", "zun", "zuo",
];

/// Syllables indexed by initial and first final letter.
#[derive(Debug, Clone, Default)]
pub struct SpellTree {
    valid: HashSet<String>,
    /// level0 -> level1 -> level-2 rests ("" when the syllable ends at level 1)
    levels: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl SpellTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree of every standard pinyin syllable.
    pub fn standard() -> Self {
        Self::with_spells(PINYIN_SYLLABLES)
    }

    /// Create a tree and insert a list of spells.
    pub fn with_spells<T: AsRef<str>>(spells: &[T]) -> Self {
        let mut tree = Self::new();
        for spell in spells {
            tree.insert(spell.as_ref());
        }
        tree
    }

    /// Insert a single spell. Blank spells are ignored.
    pub fn insert(&mut self, spell: &str) {
        let spell = spell.trim().to_ascii_lowercase();
        let Some(levels) = split_spell(&spell) else {
            return;
        };

        let level1 = self.levels.entry(levels.level0).or_default();
        if let Some(first) = levels.level1 {
            level1
                .entry(first)
                .or_default()
                .insert(levels.level2.unwrap_or_default());
        }
        self.valid.insert(spell);
    }

    pub fn len(&self) -> usize {
        self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    pub fn is_valid(&self, spell: &str) -> bool {
        self.valid.contains(spell)
    }

    /// Whether any spell starts with the initial `level0`.
    pub fn has_child(&self, level0: &str) -> bool {
        self.levels.contains_key(level0)
    }

    /// First final letters following `level0`.
    pub fn level1_chars(&self, level0: &str) -> Vec<String> {
        self.levels
            .get(level0)
            .map(|level1| level1.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Level-2 continuations of `level0` + `level1`, each starting with
    /// `level1`, shortest first.
    pub fn next_chars(&self, level0: &str, level1: &str) -> Vec<String> {
        let Some(rests) = self.levels.get(level0).and_then(|l1| l1.get(level1)) else {
            return Vec::new();
        };
        let mut next: Vec<String> = rests
            .iter()
            .filter(|rest| !rest.is_empty())
            .map(|rest| format!("{}{}", level1, rest))
            .collect();
        next.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        next
    }

    /// Every spell starting with `level0`, shortest first.
    pub fn spells_starting_with(&self, level0: &str) -> Vec<String> {
        let mut spells: Vec<String> = self
            .valid
            .iter()
            .filter(|spell| split_spell(spell).is_some_and(|levels| levels.level0 == level0))
            .cloned()
            .collect();
        spells.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        spells
    }
}
