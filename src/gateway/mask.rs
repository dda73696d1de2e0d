use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug)]
pub struct Masked;

pub trait MaskPolicy {
    fn mask(card: &str) -> String;
}

impl MaskPolicy for Masked {
    fn mask(card: &str) -> String {
        let len = card.len();
        if len > 4 && card.is_char_boundary(len - 4) {
            "*".repeat(len - 4) + &card[len - 4..]
        } else {
            card.to_string()
        }
    }
}

/// Return true if a key name holds a PAN.
///
/// A bare `number` is only a PAN inside a `card` object, elsewhere it is a house number.
fn is_pan_key(key: &str, in_card: bool) -> bool {
    let k = key.to_lowercase();
    (in_card && k == "number")
        || k == "pan"
        || k.contains("card_number")
        || k.contains("cardnumber")
}

/// Return true if a key name likely holds a CVV/CVC.
fn is_cvv_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k.contains("cvv") || k.contains("cvc") || k.contains("verification_value")
}

pub fn secure_serializable(v: impl Serialize) -> Value {
    let value = serde_json::to_value(v).expect("serialization is infallible");
    secure_value(&value)
}

pub fn secure_value(v: &Value) -> Value {
    secure_nested(v, false)
}

fn secure_nested(v: &Value, in_card: bool) -> Value {
    match v {
        Value::Object(map) => {
            let mut new = serde_json::Map::with_capacity(map.len());
            for (k, val) in map {
                let is_pan = is_pan_key(k, in_card);
                let is_cvv = is_cvv_key(k);
                let new_val = match val {
                    Value::String(s) if is_pan => Value::String(Masked::mask(s)),
                    Value::String(_) if is_cvv => Value::String("***".to_string()),
                    Value::Number(n) if is_pan => Value::String(Masked::mask(&n.to_string())),
                    Value::Number(_) if is_cvv => Value::String("***".to_string()),
                    _ => secure_nested(val, k.eq_ignore_ascii_case("card")),
                };
                new.insert(k.clone(), new_val);
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(|v| secure_nested(v, in_card)).collect()),
        // primitives that are not objects: leave them as-is
        other => other.clone(),
    }
}

static BASIC_AUTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Authorization:\s*Basic\s+)[A-Za-z0-9+/=]+").expect("pattern is valid")
});
static CARD_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"("card"\s*:\s*\{[^{}]*?"number"\s*:\s*")([0-9]+)(")"#).expect("pattern is valid")
});
static CVV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"("cvv"\s*:\s*")[0-9]*(")"#).expect("pattern is valid")
});

/// Strip credentials and card data from a raw HTTP transcript
pub fn scrub(transcript: &str) -> String {
    let scrubbed = BASIC_AUTH.replace_all(transcript, "${1}[FILTERED]");
    let scrubbed = CARD_NUMBER.replace_all(&scrubbed, |caps: &Captures| {
        format!("{}{}{}", &caps[1], Masked::mask(&caps[2]), &caps[3])
    });
    CVV.replace_all(&scrubbed, "${1}[FILTERED]${2}").into_owned()
}
