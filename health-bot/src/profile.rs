//! Physiological profile view: BMR/TDEE derivation and the text injected into prompts.

use storage::UserProfileRecord;

pub const PROFILE_MISSING: &str = "用戶尚未建立個人生理指標資料。";

/// Activity factor applied to BMR (sedentary).
const ACTIVITY_FACTOR: f64 = 1.2;

/// A profile with all numeric metrics present. Missing gender is treated as female.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysiologicalProfile {
    pub age: i64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: String,
}

impl PhysiologicalProfile {
    pub fn from_record(record: &UserProfileRecord) -> Option<Self> {
        Some(Self {
            age: record.age?,
            height_cm: record.height?,
            weight_kg: record.weight?,
            gender: record
                .gender
                .clone()
                .filter(|g| !g.trim().is_empty())
                .unwrap_or_else(|| "女".to_string()),
        })
    }

    fn is_male(&self) -> bool {
        self.gender.contains('男')
    }

    /// Mifflin-St Jeor: 10·w + 6.25·h − 5·a + s, s = +5 (male) or −161.
    pub fn bmr(&self) -> f64 {
        let s = if self.is_male() { 5.0 } else { -161.0 };
        10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * self.age as f64 + s
    }

    pub fn tdee(&self) -> f64 {
        self.bmr() * ACTIVITY_FACTOR
    }

    pub fn render(&self) -> String {
        format!(
            "用戶背景：{}性、{}歲、{}cm、{}kg。 系統鎖定數值：BMR 為 {} kcal，TDEE 為 {} kcal。",
            self.gender,
            self.age,
            self.height_cm,
            self.weight_kg,
            self.bmr().round() as i64,
            self.tdee().round() as i64
        )
    }
}

/// Renders the stored profile for prompts; incomplete or absent profiles get a fixed sentence.
pub fn render_profile(record: Option<&UserProfileRecord>) -> String {
    record
        .and_then(PhysiologicalProfile::from_record)
        .map(|p| p.render())
        .unwrap_or_else(|| PROFILE_MISSING.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(age: Option<i64>, height: Option<f64>, weight: Option<f64>, gender: Option<&str>) -> UserProfileRecord {
        UserProfileRecord {
            user_id: "u1".to_string(),
            age,
            height,
            weight,
            gender: gender.map(str::to_string),
            current_state: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_bmr_and_tdee_for_female_profile() {
        let r = record(Some(25), Some(165.0), Some(50.0), Some("女"));
        let p = PhysiologicalProfile::from_record(&r).unwrap();
        assert!((p.bmr() - 1234.25).abs() < 1e-9);
        let text = p.render();
        assert!(text.contains("BMR 為 1234 kcal"), "{}", text);
        assert!(text.contains("TDEE 為 1481 kcal"), "{}", text);
        assert!(text.starts_with("用戶背景：女性、25歲、165cm、50kg。"), "{}", text);
    }

    #[test]
    fn test_male_offset() {
        let r = record(Some(30), Some(175.0), Some(70.0), Some("男"));
        let p = PhysiologicalProfile::from_record(&r).unwrap();
        assert!((p.bmr() - 1648.75).abs() < 1e-9);
    }

    #[test]
    fn test_missing_gender_uses_female_offset() {
        let r = record(Some(25), Some(165.0), Some(50.0), None);
        let p = PhysiologicalProfile::from_record(&r).unwrap();
        assert!((p.bmr() - 1234.25).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_profile_renders_fixed_text() {
        let r = record(None, Some(165.0), Some(50.0), Some("女"));
        assert_eq!(render_profile(Some(&r)), PROFILE_MISSING);
        assert_eq!(render_profile(None), PROFILE_MISSING);
    }
}
