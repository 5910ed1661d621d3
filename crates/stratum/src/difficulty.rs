use super::*;

/// Pool share difficulty as carried by `mining.set_difficulty`: a positive
/// number, integer or float on the wire.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Difficulty(f64);

impl Difficulty {
    pub fn new(difficulty: f64) -> Option<Self> {
        (difficulty.is_finite() && difficulty > 0.0).then_some(Self(difficulty))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    pub fn to_target(self) -> Target {
        Target::from_difficulty(self.0)
    }
}

impl From<Target> for Difficulty {
    fn from(target: Target) -> Self {
        Self(target.difficulty())
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        if self.0 >= 1.0 && self.0.fract() == 0.0 && self.0 <= u64::MAX as f64 {
            ser.serialize_u64(self.0 as u64)
        } else {
            ser.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Int(u64),
            Float(f64),
        }

        let value = match Wire::deserialize(de)? {
            Wire::Int(u) => u as f64,
            Wire::Float(x) => x,
        };

        Self::new(value).ok_or_else(|| de::Error::custom("difficulty must be finite and > 0"))
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(p) = f.precision() {
            write!(f, "{:.*}", p, self.0)
        } else if self.0 >= 1.0 {
            write!(f, "{}", self.0.floor() as u64)
        } else {
            let s = format!("{:.8}", self.0);
            f.write_str(s.trim_end_matches('0').trim_end_matches('.'))
        }
    }
}
