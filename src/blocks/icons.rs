//! Icon names blocks may reference.
//!
//! Stored names are the PascalCase lucide names editors pick from; anything
//! outside the set resolves to [`Icon::FALLBACK`].

use std::str::FromStr;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Icon {
    Activity,
    AlertCircle,
    Award,
    BarChart,
    Bell,
    Book,
    Briefcase,
    Calendar,
    Camera,
    Check,
    CheckCircle,
    Clock,
    Cloud,
    Code,
    Coffee,
    CreditCard,
    Database,
    DollarSign,
    Download,
    Facebook,
    Gift,
    Globe,
    Heart,
    HelpCircle,
    Home,
    Instagram,
    Linkedin,
    Lock,
    Mail,
    MapPin,
    MessageCircle,
    Phone,
    Rocket,
    Search,
    Settings,
    Shield,
    ShoppingCart,
    Smile,
    Star,
    Target,
    ThumbsUp,
    TrendingUp,
    Truck,
    Twitter,
    User,
    Users,
    Youtube,
    Zap,
}

impl Icon {
    pub const FALLBACK: Icon = Icon::HelpCircle;

    /// Total lookup: empty or unknown names give the fallback.
    pub fn from_name(name: &str) -> Icon {
        Icon::from_str(name.trim()).unwrap_or(Self::FALLBACK)
    }

    /// Lookup for optional icons (button and footer entries): empty means none.
    pub fn optional(name: &str) -> Option<Icon> {
        if name.trim().is_empty() {
            None
        } else {
            Some(Self::from_name(name))
        }
    }

    /// lucide's kebab-case identifier, e.g. `HelpCircle` -> `help-circle`.
    pub fn kebab(self) -> String {
        let mut out = String::new();
        for (i, ch) in self.as_ref().char_indices() {
            if ch.is_ascii_uppercase() && i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        }
        out
    }

    /// Names offered by icon pickers.
    pub fn names() -> Vec<&'static str> {
        Icon::iter().map(|icon| icon.into()).collect()
    }
}
