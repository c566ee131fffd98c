/// Declares a handle type together with an append-only vector that can only
/// be indexed by it.
///
/// Handles into per-BSGS storage use this so that a point (`usize`) can never
/// be confused with a handle.
#[macro_export]
macro_rules! define_indexed_vec {
    (
        $(#[$idx_meta:meta])*
        $idx_vis:vis struct $Idx:ident ;

        $(#[$vec_meta:meta])*
        $vec_vis:vis struct $Vec:ident ;
    ) => {
        $(#[$idx_meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
        $idx_vis struct $Idx(pub usize);

        impl ::std::fmt::Display for $Idx {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }

        $(#[$vec_meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
        $vec_vis struct $Vec<T>(::std::vec::Vec<T>);

        impl<T> ::std::ops::Index<$Idx> for $Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, i: $Idx) -> &T {
                &self.0[i.0]
            }
        }

        impl<T> $Vec<T> {
            pub fn new() -> Self {
                $Vec(::std::vec::Vec::new())
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Appends `value`; the returned handle stays valid for the
            /// lifetime of the vector.
            pub fn push(&mut self, value: T) -> $Idx {
                self.0.push(value);
                $Idx(self.0.len() - 1)
            }

            pub fn pop(&mut self) -> Option<T> {
                self.0.pop()
            }

            pub fn get(&self, idx: $Idx) -> Option<&T> {
                self.0.get(idx.0)
            }

            /// Maps every entry, keeping handles valid.
            pub fn map_values<U>(&self, f: impl FnMut(&T) -> U) -> $Vec<U> {
                $Vec(self.0.iter().map(f).collect())
            }
        }
    };
}
