//! The fixed set of Measurement Protocol events and their parameter schemas.
//!
//! The event names and parameters follow the GA4 recommended events reference:
//! <https://developers.google.com/analytics/devguides/collection/protocol/ga4/reference/events>

use crate::{models::ParameterType, Error};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Definition of one parameter in an event schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Parameter name as sent on the wire.
    pub name: &'static str,
    /// Type of values the parameter accepts.
    pub parameter_type: ParameterType,
    /// Whether GA requires the parameter for this event.
    pub required: bool,
}

const fn string(name: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        parameter_type: ParameterType::String,
        required: false,
    }
}

const fn number(name: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        parameter_type: ParameterType::Number,
        required: false,
    }
}

const fn array(name: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        parameter_type: ParameterType::Array,
        required: false,
    }
}

const fn required(spec: ParameterSpec) -> ParameterSpec {
    ParameterSpec {
        required: true,
        ..spec
    }
}

const COMMERCE: &[ParameterSpec] = &[string("currency"), required(array("items")), number("value")];

const CHECKOUT: &[ParameterSpec] = &[
    string("coupon"),
    string("currency"),
    required(array("items")),
    number("value"),
];

const PAYMENT_INFO: &[ParameterSpec] = &[
    string("coupon"),
    string("currency"),
    required(array("items")),
    string("payment_type"),
    number("value"),
];

const SHIPPING_INFO: &[ParameterSpec] = &[
    string("coupon"),
    string("currency"),
    required(array("items")),
    string("shipping_tier"),
    number("value"),
];

const TRANSACTION: &[ParameterSpec] = &[
    string("affiliation"),
    string("coupon"),
    string("currency"),
    array("items"),
    number("shipping"),
    number("tax"),
    required(string("transaction_id")),
    number("value"),
];

const ITEM_LIST: &[ParameterSpec] = &[
    required(array("items")),
    string("item_list_id"),
    string("item_list_name"),
];

const PROMOTION: &[ParameterSpec] = &[
    string("creative_name"),
    string("creative_slot"),
    array("items"),
    string("location_id"),
    string("promotion_id"),
    string("promotion_name"),
];

const METHOD: &[ParameterSpec] = &[string("method")];

const NONE: &[ParameterSpec] = &[];

macro_rules! event_types {
    ($($variant:ident => $name:literal, $schema:expr;)*) => {
        /// A Measurement Protocol event kind.
        ///
        /// Each kind has a fixed wire name and a fixed parameter schema. `CustomEvent` has no schema
        /// parameters and carries a user chosen name instead.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum MpEventType {
            $(
                #[doc = concat!("`", $name, "`")]
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl MpEventType {
            /// Every supported event kind.
            pub const ALL: &'static [MpEventType] = &[$(MpEventType::$variant),*];

            /// Wire name of the event kind, e.g. `add_to_cart`.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(MpEventType::$variant => $name,)*
                }
            }

            /// Parameters declared for this event kind, in display order.
            pub fn schema(&self) -> &'static [ParameterSpec] {
                match self {
                    $(MpEventType::$variant => {
                        const SCHEMA: &[ParameterSpec] = $schema;
                        SCHEMA
                    })*
                }
            }

            /// Look up an event kind by its wire name.
            pub fn from_name(name: &str) -> Option<MpEventType> {
                match name {
                    $($name => Some(MpEventType::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

event_types! {
    CustomEvent => "custom_event", NONE;
    AddPaymentInfo => "add_payment_info", PAYMENT_INFO;
    AddShippingInfo => "add_shipping_info", SHIPPING_INFO;
    AddToCart => "add_to_cart", COMMERCE;
    AddToWishlist => "add_to_wishlist", COMMERCE;
    BeginCheckout => "begin_checkout", CHECKOUT;
    EarnVirtualCurrency => "earn_virtual_currency", &[
        required(string("virtual_currency_name")),
        required(number("value")),
    ];
    GenerateLead => "generate_lead", &[string("currency"), number("value")];
    JoinGroup => "join_group", &[string("group_id")];
    LevelUp => "level_up", &[number("level"), string("character")];
    Login => "login", METHOD;
    PostScore => "post_score", &[
        required(number("score")),
        number("level"),
        string("character"),
    ];
    Purchase => "purchase", TRANSACTION;
    Refund => "refund", TRANSACTION;
    RemoveFromCart => "remove_from_cart", COMMERCE;
    Search => "search", &[required(string("search_term"))];
    SelectContent => "select_content", &[string("content_type"), string("item_id")];
    SelectItem => "select_item", ITEM_LIST;
    SelectPromotion => "select_promotion", PROMOTION;
    Share => "share", &[string("method"), string("content_type"), string("item_id")];
    SignUp => "sign_up", METHOD;
    SpendVirtualCurrency => "spend_virtual_currency", &[
        string("item_name"),
        required(string("virtual_currency_name")),
        required(number("value")),
    ];
    TutorialBegin => "tutorial_begin", NONE;
    TutorialComplete => "tutorial_complete", NONE;
    UnlockAchievement => "unlock_achievement", &[required(string("achievement_id"))];
    ViewCart => "view_cart", COMMERCE;
    ViewItem => "view_item", COMMERCE;
    ViewItemList => "view_item_list", ITEM_LIST;
    ViewPromotion => "view_promotion", PROMOTION;
    ViewSearchResults => "view_search_results", &[string("search_term")];
}

impl fmt::Display for MpEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MpEventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MpEventType::from_name(s).ok_or_else(|| Error::UnknownEventType(s.to_string()))
    }
}
