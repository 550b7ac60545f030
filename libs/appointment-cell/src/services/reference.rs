// libs/appointment-cell/src/services/reference.rs
use uuid::Uuid;

pub const REFERENCE_PREFIX: &str = "APPT-";
const REFERENCE_LENGTH: usize = 8;
const REFERENCE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Patient-facing booking reference such as `APPT-7K2M9QXA`.
///
/// Codes are random rather than sequential and are not checked against
/// existing bookings.
pub fn generate_reference_number() -> String {
    reference_from_uuid(Uuid::new_v4())
}

/// Encodes the low bits of `id` in base 36. The low 62 bits of a v4 UUID are
/// random, which covers the ~41 bits eight characters need.
pub fn reference_from_uuid(id: Uuid) -> String {
    let mut value = id.as_u128();
    let mut reference = String::with_capacity(REFERENCE_PREFIX.len() + REFERENCE_LENGTH);
    reference.push_str(REFERENCE_PREFIX);

    for _ in 0..REFERENCE_LENGTH {
        reference.push(REFERENCE_ALPHABET[(value % 36) as usize] as char);
        value /= 36;
    }
    reference
}
