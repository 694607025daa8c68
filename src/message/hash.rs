//! Callsign hashing for type 3 messages
//!
//! Type 3 messages carry a 15-bit hash of the sender's callsign instead of the
//! callsign itself. The hash is Bob Jenkins' lookup3 `hashlittle` with seed 146;
//! resolving it needs a callsign seen earlier in a type 1 or type 2 message.

use lru::LruCache;

const HASH_SEED: u32 = 146;
const HASH_MASK: u32 = 0x7fff;
const CACHE_CAPACITY: usize = 1000;

#[inline]
fn mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_sub(*c); *a ^= c.rotate_left(4);  *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a); *b ^= a.rotate_left(6);  *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b); *c ^= b.rotate_left(8);  *b = b.wrapping_add(*a);
    *a = a.wrapping_sub(*c); *a ^= c.rotate_left(16); *c = c.wrapping_add(*b);
    *b = b.wrapping_sub(*a); *b ^= a.rotate_left(19); *a = a.wrapping_add(*c);
    *c = c.wrapping_sub(*b); *c ^= b.rotate_left(4);  *b = b.wrapping_add(*a);
}

#[inline]
fn finalize(a: &mut u32, b: &mut u32, c: &mut u32) {
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(14));
    *a ^= *c; *a = a.wrapping_sub(c.rotate_left(11));
    *b ^= *a; *b = b.wrapping_sub(a.rotate_left(25));
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(16));
    *a ^= *c; *a = a.wrapping_sub(c.rotate_left(4));
    *b ^= *a; *b = b.wrapping_sub(a.rotate_left(14));
    *c ^= *b; *c = c.wrapping_sub(b.rotate_left(24));
}

/// lookup3 `hashlittle` over a byte string
pub fn hashlittle(key: &[u8], initval: u32) -> u32 {
    let init = 0xdead_beefu32.wrapping_add(key.len() as u32).wrapping_add(initval);
    let (mut a, mut b, mut c) = (init, init, init);

    let word = |bytes: &[u8]| -> u32 {
        bytes.iter().enumerate().fold(0u32, |acc, (i, &byte)| acc | (byte as u32) << (8 * i))
    };

    let mut rest = key;
    while rest.len() > 12 {
        a = a.wrapping_add(word(&rest[0..4]));
        b = b.wrapping_add(word(&rest[4..8]));
        c = c.wrapping_add(word(&rest[8..12]));
        mix(&mut a, &mut b, &mut c);
        rest = &rest[12..];
    }

    if rest.is_empty() {
        return c;
    }

    a = a.wrapping_add(word(&rest[..rest.len().min(4)]));
    if rest.len() > 4 {
        b = b.wrapping_add(word(&rest[4..rest.len().min(8)]));
    }
    if rest.len() > 8 {
        c = c.wrapping_add(word(&rest[8..]));
    }
    finalize(&mut a, &mut b, &mut c);
    c
}

/// 15-bit callsign hash carried by type 3 messages
pub fn callsign_hash(callsign: &str) -> u16 {
    (hashlittle(callsign.as_bytes(), HASH_SEED) & HASH_MASK) as u16
}

/// Recently decoded callsigns keyed by their 15-bit hash
pub struct CallsignHashCache {
    cache: LruCache<u16, String>,
}

impl CallsignHashCache {
    pub fn new() -> Self {
        Self { cache: LruCache::new(CACHE_CAPACITY) }
    }

    pub fn insert(&mut self, callsign: &str) {
        self.cache.put(callsign_hash(callsign), callsign.to_string());
    }

    pub fn lookup(&mut self, hash: u16) -> Option<String> {
        self.cache.get(&hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for CallsignHashCache {
    fn default() -> Self {
        Self::new()
    }
}
