//! Static roster and style tables.

/// A fixed visual treatment applied to every user's avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePreset {
    /// Machine name, used in object keys.
    pub name: &'static str,
    /// Human-readable name, used in logs.
    pub display_name: &'static str,
    /// Style-specific tail of the generation prompt.
    pub prompt_suffix: &'static str,
}

/// A roster entry and the scene their avatars are set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamMember {
    /// Unique name, also the key of the `users` row.
    pub name: &'static str,
    /// Background scene description.
    pub setting: &'static str,
    /// Short label for the setting.
    pub setting_short: &'static str,
}

impl TeamMember {
    /// Lowercased name, as used for source photo file names and object keys.
    pub fn slug(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Avatar styles, in generation order.
pub const STYLES: [StylePreset; 6] = [
    StylePreset {
        name: "ukiyoe",
        display_name: "Ukiyo-e",
        prompt_suffix: "in traditional Japanese ukiyo-e woodblock print style, bold outlines, flat areas of rich color, Edo period aesthetic, like artwork by Hokusai or Hiroshige",
    },
    StylePreset {
        name: "sakura_anime",
        display_name: "Sakura Anime",
        prompt_suffix: "in beautiful modern anime style with cherry blossoms, soft pink lighting, sparkling atmosphere, detailed expressive eyes, like a high-budget anime movie poster",
    },
    StylePreset {
        name: "sumi_ink",
        display_name: "Sumi-e Ink",
        prompt_suffix: "in Japanese sumi-e ink wash painting style with subtle watercolor accents, elegant brushstrokes, zen minimalism, traditional calligraphy aesthetic, contemplative mood",
    },
    StylePreset {
        name: "shrine_spirit",
        display_name: "Shrine Spirit",
        prompt_suffix: "in mystical Japanese shrine spirit style, ethereal glowing effects, traditional Shinto aesthetic, sacred atmosphere, omamori charm colors, spiritual and serene",
    },
    StylePreset {
        name: "neo_tokyo",
        display_name: "Neo Tokyo",
        prompt_suffix: "in futuristic Neo Tokyo cyberpunk style, neon pink and electric blue lights, rain-slicked reflections, kanji holographic signs, Akira and Ghost in the Shell inspired",
    },
    StylePreset {
        name: "ghibli_dream",
        display_name: "Ghibli Dream",
        prompt_suffix: "in Studio Ghibli inspired fantasy style, warm nostalgic lighting, magical whimsy, hand-painted texture, enchanting and heartwarming, Miyazaki film aesthetic",
    },
];

/// The team, in processing order.
pub const ROSTER: [TeamMember; 7] = [
    TeamMember {
        name: "Julian",
        setting: "standing beneath a magnificent weeping cherry blossom tree in full bloom, petals drifting in the breeze, soft spring sunlight filtering through pink canopy",
        setting_short: "Cherry Blossom",
    },
    TeamMember {
        name: "Dave",
        setting: "at a serene viewpoint overlooking Mount Fuji at golden hour, the iconic snow-capped peak glowing in warm sunset colors, Lake Kawaguchi reflecting the scene",
        setting_short: "Mount Fuji",
    },
    TeamMember {
        name: "Jason",
        setting: "walking through the towering green bamboo groves of Arashiyama, dappled sunlight streaming through swaying stalks, peaceful and mysterious atmosphere",
        setting_short: "Bamboo Forest",
    },
    TeamMember {
        name: "Frank",
        setting: "in a traditional Japanese tea ceremony room, warm wood tones, shoji screen windows, steam rising from a ceramic tea cup, tatami floor, meditative ambiance",
        setting_short: "Tea Ceremony",
    },
    TeamMember {
        name: "Cathy",
        setting: "standing before a vermillion torii gate pathway at Fushimi Inari shrine, lanterns glowing softly, morning mist creating ethereal depth, sacred atmosphere",
        setting_short: "Torii Gates",
    },
    TeamMember {
        name: "Matylda",
        setting: "beside a tranquil Japanese garden with colorful koi swimming in crystal clear water, stone lanterns, perfectly raked zen gravel, autumn maple leaves floating",
        setting_short: "Koi Garden",
    },
    TeamMember {
        name: "Patryk",
        setting: "on a rooftop overlooking the glittering Tokyo skyline at night, Tokyo Tower glowing red in the distance, city lights creating a sea of stars below",
        setting_short: "Tokyo Night",
    },
];
