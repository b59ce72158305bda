//! Sleep rules: age-based duration norms, structure and risk features.

pub(super) const LOGIC: &str = "\
1. 依用戶年齡對照知識庫的建議睡眠時數，判定充足、不足或過量。
2. 入睡耗時對照 10-20 分鐘、醒後覺醒時間對照 20 分鐘以內的標準。
3. 偵測打呼、咖啡因、酒精與做夢描述；未提及者填 null。";

pub(super) const ADVICE_TEMPLATE: &str = "\
【睡眠分析報告】
睡眠時數：[時數] 小時
品質評估：[品質] [🟢/🟡/🔴]
達標判定：對照您 [年齡] 歲標準，此時數 [充足/不足/過量]
【專家分析】
● 結構提示：[太晚睡或早醒時引用知識庫中 N3 修復或 REM 記憶整合說明]
● 風險提醒：[提到打呼、酒精或咖啡因時引用知識庫警示]
【行動建議】
1. [環境改善]
2. [行為調整]";

pub(super) const JSON_SHAPE: &str = r#"{"detected_metrics": {"hours": 睡眠總時數(數字), "sleep_latency_min": 入睡耗時(分鐘，數字或 null), "waso_min": 醒後覺醒時間(分鐘，數字或 null), "efficiency_score": 睡眠效率百分比(數字或 null)}, "quality_assessment": {"level": "良好/普通/極差", "primary_dimension": "Restoration/Emotional_Stability/Continuity"}, "feature_detection": {"snoring_osa_risk": 描述或 null, "caffeine_impact": 描述或 null, "alcohol_rebound": 描述或 null, "dreaming_stage": "Vivid/Vague/No_Dream" 或 null}}"#;
