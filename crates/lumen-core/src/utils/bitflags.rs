// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! The [`lumen_bitflags!`](crate::lumen_bitflags) macro.

/// Declares a copyable set of bit flags backed by an integer.
///
/// ```
/// lumen_core::lumen_bitflags! {
///     /// Which faces to touch.
///     pub struct Faces: u8 {
///         /// Front faces.
///         const FRONT = 1 << 0;
///         /// Back faces.
///         const BACK = 1 << 1;
///         /// Both.
///         const BOTH = Self::FRONT.bits() | Self::BACK.bits();
///     }
/// }
///
/// assert!(Faces::BOTH.contains(Faces::FRONT | Faces::BACK));
/// assert_eq!(format!("{:?}", Faces::BOTH), "Faces(FRONT | BACK)");
/// ```
#[macro_export]
macro_rules! lumen_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// No flag set.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag: Self = Self { bits: $value };
            )*

            /// Wraps raw bits, unknown bits included.
            pub const fn from_bits_retain(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw bits.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// `true` if no bit is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// `true` if every flag of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                self.bits & other.bits == other.bits
            }

            /// `true` if `self` and `other` share at least one flag.
            pub const fn intersects(&self, other: Self) -> bool {
                self.bits & other.bits != 0
            }

            /// The flags set in either `self` or `other`.
            #[must_use]
            pub const fn union(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }

            /// Sets the flags of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the flags of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl ::std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.insert(rhs);
            }
        }

        impl ::std::ops::BitAnd for $name {
            type Output = Self;

            fn bitand(self, rhs: Self) -> Self {
                Self { bits: self.bits & rhs.bits }
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                // Named flags consume their bits in declaration order.
                let mut rest = self.bits;
                let mut separator = "";
                write!(f, "{}(", stringify!($name))?;
                $(
                    let flag = Self::$flag.bits;
                    if flag != 0 && rest & flag == flag {
                        write!(f, "{separator}{}", stringify!($flag))?;
                        rest &= !flag;
                        separator = " | ";
                    }
                )*
                if rest != 0 {
                    write!(f, "{separator}{rest:#x}")?;
                } else if self.bits == 0 {
                    f.write_str("EMPTY")?;
                }
                f.write_str(")")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::lumen_bitflags! {
        struct Access: u32 {
            const READ = 1 << 0;
            const WRITE = 1 << 1;
            const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
            const EXEC = 1 << 4;
        }
    }

    #[test]
    fn set_operations() {
        let mut access = Access::READ;
        access |= Access::WRITE;
        assert_eq!(access, Access::READ_WRITE);
        assert!(access.contains(Access::WRITE));
        assert!(!access.contains(Access::EXEC));
        assert!(access.intersects(Access::READ | Access::EXEC));
        assert_eq!(access & Access::EXEC, Access::EMPTY);

        access.remove(Access::READ);
        assert_eq!(access, Access::WRITE);
        assert!(Access::default().is_empty());
    }

    #[test]
    fn debug_lists_named_flags_then_unknown_bits() {
        assert_eq!(format!("{:?}", Access::READ_WRITE), "Access(READ | WRITE)");
        assert_eq!(format!("{:?}", Access::EMPTY), "Access(EMPTY)");
        assert_eq!(
            format!("{:?}", Access::from_bits_retain(0x21)),
            "Access(READ | 0x20)"
        );
    }
}
