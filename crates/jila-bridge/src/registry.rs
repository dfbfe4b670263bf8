// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Append-only table of host handles, indexed by the key they were resolved
// under. Hosts hand the index out as a class or operation handle.

#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub(crate) struct Registry<K, V> {
    items: Vec<V>,
    index: HashMap<K, u32>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Registry<K, V> {
    pub(crate) fn lookup<Q>(&self, key: &Q) -> Option<u32>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).copied()
    }

    pub(crate) fn get(&self, index: u32) -> Option<&V> {
        self.items.get(index as usize)
    }

    /// Store `value` under `key` unless the key is already present, in which
    /// case `value` is dropped and the existing index returned.
    pub(crate) fn intern(&mut self, key: K, value: V) -> u32 {
        if let Some(&index) = self.index.get(&key) {
            return index;
        }
        let index = self.items.len() as u32;
        self.items.push(value);
        self.index.insert(key, index);
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_resolution_reuses_the_entry() {
        let mut classes: Registry<String, &str> = Registry::default();
        let first = classes.intern("dev/jila/JilaActivity".into(), "ref-1");
        assert_eq!(classes.lookup("dev/jila/JilaActivity"), Some(first));

        // Resolving again, as after a cleared gateway cache, adds nothing.
        for _ in 0..10 {
            let again = classes.intern("dev/jila/JilaActivity".into(), "ref-2");
            assert_eq!(again, first);
        }
        assert_eq!(classes.len(), 1);
        assert_eq!(classes.get(first), Some(&"ref-1"));
    }

    #[test]
    fn method_keys_distinguish_signature() {
        let mut methods: Registry<(u32, String, String), u8> = Registry::default();
        let a = methods.intern((0, "listFiles".into(), "(Ljava/lang/String;Z)V".into()), 1);
        let b = methods.intern(
            (0, "listFiles".into(), "(Ljava/lang/String;Z)[Ljava/lang/String;".into()),
            2,
        );
        assert_ne!(a, b);
        assert_eq!(methods.len(), 2);
        assert_eq!(methods.lookup(&(9, "listFiles".into(), "()V".into())), None);
    }
}
