//! Shared backing buffer for arrays, matrices and their views.
//!
//! A [`Storage`] is a reference-counted `Vec<Real>`; every view created from
//! a root holds another handle, so the buffer lives as long as its longest
//! holder. Borrowing is checked at run time through `RefCell`, which makes
//! the type deliberately `!Send` and `!Sync`.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use ql_core::{Real, Size};

use crate::address::Address;

/// Handle to a flat buffer of reals.
#[derive(Debug, Clone, Default)]
pub(crate) struct Storage(Rc<RefCell<Vec<Real>>>);

impl Storage {
    /// A zero-filled buffer of `len` elements.
    pub(crate) fn zeros(len: Size) -> Self {
        Self::from_vec(vec![0.0; len])
    }

    pub(crate) fn from_vec(data: Vec<Real>) -> Self {
        Self(Rc::new(RefCell::new(data)))
    }

    pub(crate) fn len(&self) -> Size {
        self.0.borrow().len()
    }

    pub(crate) fn borrow(&self) -> Ref<'_, Vec<Real>> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, Vec<Real>> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the same buffer.
    pub(crate) fn same_buffer(&self, other: &Storage) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Values of the view `addr` in row-major logical order.
    pub(crate) fn gather(&self, addr: &Address) -> Vec<Real> {
        let data = self.borrow();
        addr.iter().map(|o| data[o]).collect()
    }

    /// Overwrite the view `addr` with `values` (row-major logical order).
    pub(crate) fn scatter(&self, addr: &Address, values: &[Real]) {
        let mut data = self.borrow_mut();
        for (o, &v) in addr.iter().zip(values) {
            data[o] = v;
        }
    }

    /// `x ← f(x)` for every element of the view.
    ///
    /// No borrow is held while `f` runs, so `f` may read any view of this
    /// buffer; it sees the values from before the update.
    pub(crate) fn map_in_place(&self, addr: &Address, f: impl FnMut(Real) -> Real) {
        let values: Vec<Real> = self.gather(addr).into_iter().map(f).collect();
        self.scatter(addr, &values);
    }

    /// `x ← f(x, y)` where `y` runs over the equally-sized view `src_addr`
    /// of `src`.
    ///
    /// When both views share a buffer the source values are read in full
    /// before anything is written.
    pub(crate) fn zip_in_place(
        &self,
        addr: &Address,
        src: &Storage,
        src_addr: &Address,
        f: impl Fn(Real, Real) -> Real,
    ) {
        if self.same_buffer(src) {
            let rhs = src.gather(src_addr);
            let mut data = self.borrow_mut();
            for (o, y) in addr.iter().zip(rhs) {
                data[o] = f(data[o], y);
            }
        } else {
            let mut data = self.borrow_mut();
            let rhs = src.borrow();
            for (o, p) in addr.iter().zip(src_addr.iter()) {
                data[o] = f(data[o], rhs[p]);
            }
        }
    }
}
