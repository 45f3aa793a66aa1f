use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::types::Portal;

/// Catalog shared between the HTTP services. Admin price edits are rare and
/// last-write-wins; in-flight calculations keep the snapshot they read.
pub type SharedCatalog = Arc<RwLock<PricingCatalog>>;

/// Flat discount applied to any two-portal combination without a named bundle.
pub const DEFAULT_TWO_PORTAL_DISCOUNT: f64 = 10.0;

/// Which features belong to which portal. Static: a feature is purchasable
/// only alongside its owning portal.
const PORTAL_FEATURES: [(Portal, &[&str]); 3] = [
    (
        Portal::Admin,
        &[
            "fee_management",
            "exam_management",
            "transport_management",
            "library_management",
            "parent_communication",
        ],
    ),
    (
        Portal::Teacher,
        &[
            "gradebook",
            "lesson_planning",
            "student_analytics",
            "digital_content",
        ],
    ),
    (
        Portal::Student,
        &[
            "grade_access",
            "learning_resources",
            "communication_hub",
            "exam_preparation",
        ],
    ),
];

pub fn portal_features(portal: Portal) -> &'static [&'static str] {
    PORTAL_FEATURES
        .iter()
        .find(|(p, _)| *p == portal)
        .map(|(_, features)| *features)
        .unwrap_or(&[])
}

/// Resolves the portal a feature belongs to, if any.
pub fn feature_portal(feature_id: &str) -> Option<Portal> {
    PORTAL_FEATURES
        .iter()
        .find(|(_, features)| features.contains(&feature_id))
        .map(|(portal, _)| *portal)
}

pub struct PortalInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub core_features: &'static [&'static str],
}

pub fn portal_info(portal: Portal) -> PortalInfo {
    match portal {
        Portal::Admin => PortalInfo {
            name: "School Admin Portal",
            description: "Complete school administration and management",
            core_features: &[
                "Dashboard Overview",
                "Student Management",
                "Staff Management",
                "Basic Reports",
            ],
        },
        Portal::Teacher => PortalInfo {
            name: "Teacher Portal",
            description: "Classroom and teaching management tools",
            core_features: &[
                "Class Dashboard",
                "Attendance Management",
                "Assignment Management",
            ],
        },
        Portal::Student => PortalInfo {
            name: "Student Portal",
            description: "Student learning and progress tracking",
            core_features: &[
                "Personal Dashboard",
                "Assignment Submission",
                "Attendance View",
            ],
        },
    }
}

/// Display metadata for a feature id. Unknown ids get empty strings; the
/// catalog validates ids before they reach display paths.
pub fn feature_info(feature_id: &str) -> (&'static str, &'static str) {
    match feature_id {
        "fee_management" => ("Fee Management", "Track and manage student fee payments"),
        "exam_management" => ("Exam & Result Management", "Create exams and manage results"),
        "transport_management" => ("Transport Management", "Manage school transport routes"),
        "library_management" => ("Library Management", "Track library books and borrowing"),
        "parent_communication" => ("Parent Communication", "Send updates to parents"),
        "gradebook" => ("Gradebook & Assessment", "Manage grades and assessments"),
        "lesson_planning" => ("Lesson Planning", "Plan and organize lessons"),
        "student_analytics" => ("Student Analytics", "View student performance analytics"),
        "digital_content" => ("Digital Content Library", "Access teaching materials"),
        "grade_access" => ("Grade & Report Access", "View grades and reports"),
        "learning_resources" => ("Learning Resources", "Access study materials"),
        "communication_hub" => ("Communication Hub", "Communicate with teachers"),
        "exam_preparation" => ("Exam Preparation", "Practice tests and preparation"),
        _ => ("", ""),
    }
}

/// Named bundle discounts. Pair matching checks membership, not order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleKey {
    AdminTeacher,
    TeacherStudent,
    AllThree,
}

impl BundleKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleKey::AdminTeacher => "admin_teacher",
            BundleKey::TeacherStudent => "teacher_student",
            BundleKey::AllThree => "all_three",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BundleKey::AdminTeacher => "Admin + Teacher Bundle",
            BundleKey::TeacherStudent => "Teacher + Student Bundle",
            BundleKey::AllThree => "Complete School Bundle",
        }
    }
}

impl std::str::FromStr for BundleKey {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin_teacher" => Ok(BundleKey::AdminTeacher),
            "teacher_student" => Ok(BundleKey::TeacherStudent),
            "all_three" => Ok(BundleKey::AllThree),
            other => Err(CatalogError::UnknownBundle(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error("unknown bundle: {0}")]
    UnknownBundle(String),

    #[error("price must be non-negative, got {0}")]
    NegativePrice(i64),

    #[error("discount percent must be within 0-100, got {0}")]
    InvalidPercent(f64),
}

/// Mutable price tables. Amounts are integer INR per month; discounts are
/// percent values in [0, 100].
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    portal_prices: HashMap<Portal, i64>,
    feature_prices: HashMap<String, i64>,
    admin_teacher_discount: f64,
    teacher_student_discount: f64,
    all_three_discount: f64,
}

impl Default for PricingCatalog {
    fn default() -> Self {
        let portal_prices = HashMap::from([
            (Portal::Admin, 2000),
            (Portal::Teacher, 800),
            (Portal::Student, 400),
        ]);

        let feature_prices = HashMap::from(
            [
                ("fee_management", 500),
                ("exam_management", 400),
                ("transport_management", 300),
                ("library_management", 200),
                ("parent_communication", 250),
                ("gradebook", 300),
                ("lesson_planning", 200),
                ("student_analytics", 250),
                ("digital_content", 150),
                ("grade_access", 150),
                ("learning_resources", 200),
                ("communication_hub", 100),
                ("exam_preparation", 250),
            ]
            .map(|(id, price)| (id.to_string(), price)),
        );

        Self {
            portal_prices,
            feature_prices,
            admin_teacher_discount: 15.0,
            teacher_student_discount: 10.0,
            all_three_discount: 20.0,
        }
    }
}

impl PricingCatalog {
    pub fn portal_price(&self, portal: Portal) -> i64 {
        self.portal_prices.get(&portal).copied().unwrap_or(0)
    }

    pub fn feature_price(&self, feature_id: &str) -> i64 {
        self.feature_prices.get(feature_id).copied().unwrap_or(0)
    }

    pub fn bundle_discount(&self, key: BundleKey) -> f64 {
        match key {
            BundleKey::AdminTeacher => self.admin_teacher_discount,
            BundleKey::TeacherStudent => self.teacher_student_discount,
            BundleKey::AllThree => self.all_three_discount,
        }
    }

    pub fn set_portal_price(&mut self, portal: Portal, price: i64) -> Result<(), CatalogError> {
        if price < 0 {
            return Err(CatalogError::NegativePrice(price));
        }
        self.portal_prices.insert(portal, price);
        Ok(())
    }

    pub fn set_feature_price(&mut self, feature_id: &str, price: i64) -> Result<(), CatalogError> {
        if price < 0 {
            return Err(CatalogError::NegativePrice(price));
        }
        if !self.feature_prices.contains_key(feature_id) {
            return Err(CatalogError::UnknownFeature(feature_id.to_string()));
        }
        self.feature_prices.insert(feature_id.to_string(), price);
        Ok(())
    }

    pub fn set_bundle_discount(&mut self, key: BundleKey, percent: f64) -> Result<(), CatalogError> {
        if !(0.0..=100.0).contains(&percent) || percent.is_nan() {
            return Err(CatalogError::InvalidPercent(percent));
        }
        match key {
            BundleKey::AdminTeacher => self.admin_teacher_discount = percent,
            BundleKey::TeacherStudent => self.teacher_student_discount = percent,
            BundleKey::AllThree => self.all_three_discount = percent,
        }
        Ok(())
    }

    /// Full pricing config for the admin panel.
    pub fn admin_snapshot(&self) -> CatalogSnapshot {
        let portal_prices = Portal::ALL
            .iter()
            .map(|p| (p.to_string(), self.portal_price(*p)))
            .collect();

        let feature_prices = Portal::ALL
            .iter()
            .flat_map(|portal| {
                portal_features(*portal).iter().map(|id| {
                    let (name, description) = feature_info(id);
                    FeatureSnapshot {
                        id: id.to_string(),
                        name: name.to_string(),
                        description: description.to_string(),
                        portal: portal.to_string(),
                        price: self.feature_price(id),
                    }
                })
            })
            .collect();

        let bundle_discounts = [
            BundleKey::AdminTeacher,
            BundleKey::TeacherStudent,
            BundleKey::AllThree,
        ]
        .iter()
        .map(|key| BundleSnapshot {
            id: key.as_str().to_string(),
            name: key.display_name().to_string(),
            discount: self.bundle_discount(*key),
        })
        .collect();

        CatalogSnapshot {
            portal_prices,
            feature_prices,
            bundle_discounts,
        }
    }

    /// All portals with their display info and purchasable add-ons, for the
    /// public pricing page.
    pub fn available_portals(&self) -> Vec<PortalListing> {
        Portal::ALL
            .iter()
            .map(|portal| {
                let info = portal_info(*portal);
                PortalListing {
                    id: portal.to_string(),
                    name: info.name.to_string(),
                    description: info.description.to_string(),
                    core_features: info.core_features.iter().map(|s| s.to_string()).collect(),
                    base_price: self.portal_price(*portal),
                    available_features: self.feature_listings(*portal),
                }
            })
            .collect()
    }

    /// All features grouped by owning portal.
    pub fn available_features(&self) -> Vec<PortalFeatureGroup> {
        Portal::ALL
            .iter()
            .map(|portal| PortalFeatureGroup {
                portal_id: portal.to_string(),
                portal_name: portal_info(*portal).name.to_string(),
                features: self.feature_listings(*portal),
            })
            .collect()
    }

    pub fn bundle_discount_info(&self) -> Vec<BundleInfo> {
        [
            (BundleKey::AdminTeacher, "off Admin and Teacher portals together"),
            (BundleKey::TeacherStudent, "off Teacher and Student portals together"),
            (BundleKey::AllThree, "off all three portals"),
        ]
        .iter()
        .map(|(key, suffix)| {
            let discount = self.bundle_discount(*key);
            BundleInfo {
                id: key.as_str().to_string(),
                name: key.display_name().to_string(),
                discount,
                description: format!("{}% {}", discount.round() as i64, suffix),
            }
        })
        .collect()
    }

    fn feature_listings(&self, portal: Portal) -> Vec<FeatureListing> {
        portal_features(portal)
            .iter()
            .map(|id| {
                let (name, description) = feature_info(id);
                FeatureListing {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: description.to_string(),
                    price: self.feature_price(id),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub portal_prices: HashMap<String, i64>,
    pub feature_prices: Vec<FeatureSnapshot>,
    pub bundle_discounts: Vec<BundleSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub portal: String,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSnapshot {
    pub id: String,
    pub name: String,
    pub discount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalListing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub core_features: Vec<String>,
    pub base_price: i64,
    pub available_features: Vec<FeatureListing>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureListing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalFeatureGroup {
    pub portal_id: String,
    pub portal_name: String,
    pub features: Vec<FeatureListing>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleInfo {
    pub id: String,
    pub name: String,
    pub discount: f64,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_feature_belongs_to_exactly_one_portal() {
        let catalog = PricingCatalog::default();
        for feature in catalog.feature_prices.keys() {
            let owners = PORTAL_FEATURES
                .iter()
                .filter(|(_, features)| features.contains(&feature.as_str()))
                .count();
            assert_eq!(owners, 1, "feature {feature} must have exactly one owner");
        }
    }

    #[test]
    fn feature_info_covers_every_catalog_feature() {
        let catalog = PricingCatalog::default();
        for feature in catalog.feature_prices.keys() {
            let (name, description) = feature_info(feature);
            assert!(!name.is_empty(), "feature {feature} has no display name");
            assert!(!description.is_empty(), "feature {feature} has no description");
        }
        assert_eq!(feature_info("time_travel"), ("", ""));
    }

    #[test]
    fn set_feature_price_rejects_unknown_ids() {
        let mut catalog = PricingCatalog::default();
        let err = catalog.set_feature_price("time_travel", 100).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownFeature(_)));
        // Known id still updates.
        catalog.set_feature_price("gradebook", 350).unwrap();
        assert_eq!(catalog.feature_price("gradebook"), 350);
    }

    #[test]
    fn set_bundle_discount_rejects_out_of_range() {
        let mut catalog = PricingCatalog::default();
        assert!(catalog
            .set_bundle_discount(BundleKey::AllThree, 101.0)
            .is_err());
        assert!(catalog
            .set_bundle_discount(BundleKey::AllThree, -1.0)
            .is_err());
        catalog.set_bundle_discount(BundleKey::AllThree, 25.0).unwrap();
        assert_eq!(catalog.bundle_discount(BundleKey::AllThree), 25.0);
    }

    #[test]
    fn negative_portal_price_rejected() {
        let mut catalog = PricingCatalog::default();
        assert!(catalog.set_portal_price(Portal::Admin, -5).is_err());
        assert_eq!(catalog.portal_price(Portal::Admin), 2000);
    }
}
