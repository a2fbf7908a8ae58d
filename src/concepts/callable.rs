//! Operations callable with a bound argument tuple
//!
//! Arguments travel as a tuple so a launcher can take "an operation plus its
//! arguments" as two values: `run(add, (1, 2))`, `run(tick, ())`.

/// An operation that can be invoked once with the argument tuple `Args`.
pub trait Callable<Args> {
    /// Value produced by the operation
    type Output;

    /// Invoke the operation, consuming it.
    fn call_with(self, args: Args) -> Self::Output;
}

/// An operation that can be invoked repeatedly with the argument tuple `Args`.
pub trait CallableMut<Args> {
    /// Value produced by each invocation
    type Output;

    /// Invoke the operation without consuming it.
    fn call_mut_with(&mut self, args: Args) -> Self::Output;
}

macro_rules! impl_callable {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, Ret, $($ty,)*> Callable<($($ty,)*)> for Func
        where
            Func: FnOnce($($ty),*) -> Ret,
        {
            type Output = Ret;

            fn call_with(self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Func, Ret, $($ty,)*> CallableMut<($($ty,)*)> for Func
        where
            Func: FnMut($($ty),*) -> Ret,
        {
            type Output = Ret;

            fn call_mut_with(&mut self, ($($arg,)*): ($($ty,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A a);
impl_callable!(A a, B b);
impl_callable!(A a, B b, C c);
impl_callable!(A a, B b, C c, D d);
impl_callable!(A a, B b, C c, D d, E e);
impl_callable!(A a, B b, C c, D d, E e, F f);
impl_callable!(A a, B b, C c, D d, E e, F f, G g);
impl_callable!(A a, B b, C c, D d, E e, F f, G g, H h);
