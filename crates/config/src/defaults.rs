use ledgermatch_recon::supplier::{NameMapping, SupplierConfig};

/// Details substring -> supplier id, as shipped.
const DEFAULT_NAMES: [(&str, &str); 27] = [
    ("בזק בינלאומי ב", "30006"),
    ("פרי ירוחם חב'", "34714"),
    ("סלקום ישראל בע", "30055"),
    ("בזק-הוראות קבע", "34746"),
    ("דרך ארץ הייווי", "34602"),
    ("גלובס פבלישר ע", "30067"),
    ("פלאפון תקשורת", "30030"),
    ("מרכז הכוכביות", "30002"),
    ("ע.אשדוד-מסים", "30056"),
    ("א.ש.א(בס\"ד)אחז", "30050"),
    ("או.פי.ג'י(מ.כ)", "30047"),
    ("רשות האכיפה וה", "67-1"),
    ("קול ביז מילניו", "30053"),
    ("פריוריטי סופטו", "30097"),
    ("אינטרנט רימון", "34636"),
    ("עו\"דכנית בע\"מ", "30018"),
    ("עיריית רמת גן", "30065"),
    ("פז חברת נפט בע", "34811"),
    ("ישראכרט", "28002"),
    ("חברת החשמל ליש", "30015"),
    ("הפניקס ביטוח", "34686"),
    ("מימון ישיר מקב", "34002"),
    ("שלמה טפר", "30247"),
    ("נמרוד תבור עורך-דין", "30038"),
    ("עיריית בית שמש", "34805"),
    ("פז קמעונאות וא", "34811"),
    ("הו\"ק הלו' רבית", "8004"),
];

/// Built-in supplier mapping: the shipped name list and no amount entries.
pub fn default_suppliers() -> SupplierConfig {
    SupplierConfig {
        names: DEFAULT_NAMES
            .iter()
            .map(|(pattern, supplier)| NameMapping {
                pattern: pattern.to_string(),
                supplier: supplier.to_string(),
            })
            .collect(),
        amounts: Default::default(),
    }
}
