//! Function overload resolution.
//!
//! A candidate's cost starts at zero and accumulates per mismatch; the
//! minimum-cost candidate wins, first-seen breaking ties. A cost at or
//! above [`REJECT`] means "no viable overload" and surfaces as a lookup
//! failure, never a panic.

use crate::{FuncLookupError, InfoId, Lookup};
use sable_ir::{FunctionData, Name, Type, TypeId};

/// Cost assigned to a candidate whose arity cannot fit the call.
pub const REJECT: i32 = 1000;
/// Cost of a base-type mismatch at one argument position.
pub const BASE_MISMATCH: i32 = 10;
/// Cost of a pointer-indirection-depth mismatch at one position.
pub const DEREF_MISMATCH: i32 = 10;
/// Cost of passing a more-const-qualified argument than the parameter.
pub const CONST_MISMATCH: i32 = 5;

/// Flattened view of a type for cost comparison: the unwound base type,
/// cv-qualification, and pointer depth.
#[derive(Copy, Clone, Debug)]
pub struct TypeInfo {
    pub base: TypeId,
    pub is_const: bool,
    pub is_volatile: bool,
    pub deref: i32,
    pub is_null: bool,
}

impl<'a> Lookup<'a> {
    /// Compute the flattened [`TypeInfo`] of a type.
    pub fn type_info(&self, ty: TypeId) -> TypeInfo {
        let mut info = TypeInfo {
            base: ty,
            is_const: false,
            is_volatile: false,
            deref: 0,
            is_null: false,
        };
        if !ty.is_valid() {
            return info;
        }
        let const_ = self.interner.intern("const");
        let volatile = self.interner.intern("volatile");
        let star = self.interner.intern("*");
        let brackets = self.interner.intern("[]");
        let mut current = ty;
        // Bounded walk; type chains are shallow in practice.
        for _ in 0..32 {
            match self.types.get(current) {
                Type::Modifier { alias, pre, post } => {
                    for &m in pre.iter() {
                        if m == const_ {
                            info.is_const = true;
                        } else if m == volatile {
                            info.is_volatile = true;
                        }
                    }
                    for &m in post.iter() {
                        if m == star || m == brackets {
                            info.deref += 1;
                        }
                    }
                    current = *alias;
                }
                Type::Array { alias, sizes } => {
                    info.deref += sizes.len().max(1) as i32;
                    current = *alias;
                }
                Type::Parameterized { template, .. } if template.is_valid() => {
                    current = *template;
                }
                Type::Declared { .. } => {
                    let followed = self.follow_typedef(current);
                    if followed == current {
                        break;
                    }
                    current = followed;
                }
                Type::Base { name } => {
                    if name.len() == 1 && name[0] == self.interner.intern("__null_t") {
                        info.is_null = true;
                    }
                    break;
                }
                _ => break,
            }
        }
        info.base = current;
        info
    }

    /// Minimum-cost candidate for the call, with its cost. `None` only
    /// when `candidates` is empty.
    pub fn best_function(
        &self,
        candidates: &[sable_ir::DeclId],
        args: &[TypeId],
    ) -> Option<(sable_ir::DeclId, i32)> {
        let arg_infos: Vec<TypeInfo> = args.iter().map(|&a| self.type_info(a)).collect();
        let mut best: Option<(sable_ir::DeclId, i32)> = None;
        for &candidate in candidates {
            let Some(data) = self.decls.get(candidate).as_function() else {
                continue;
            };
            let cost = self.function_cost(data, &arg_infos);
            // Strict comparison: first-seen wins ties.
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((candidate, cost));
            }
        }
        best
    }

    fn function_cost(&self, func: &FunctionData, args: &[TypeInfo]) -> i32 {
        let ellipsis = func
            .params
            .last()
            .is_some_and(|p| self.is_ellipsis(p.ptype));
        let num_params = func.params.len() - usize::from(ellipsis);
        let num_default = func.params[..num_params]
            .iter()
            .rev()
            .take_while(|p| p.has_default())
            .count();

        if !ellipsis && args.len() > num_params {
            return REJECT;
        }
        if args.len() + num_default < num_params {
            return REJECT;
        }

        let mut cost = 0;
        for (arg, param) in args.iter().zip(func.params[..num_params].iter()) {
            cost += self.conversion_cost(arg, param.ptype);
        }
        cost
    }

    fn conversion_cost(&self, arg: &TypeInfo, param_type: TypeId) -> i32 {
        if !arg.base.is_valid() {
            return 0;
        }
        let param = self.type_info(param_type);
        // A null argument converts to any pointer for free.
        if arg.is_null && param.deref > 0 {
            return 0;
        }
        let mut cost = 0;
        if arg.base != param.base {
            cost += BASE_MISMATCH;
        }
        if arg.deref != param.deref {
            cost += DEREF_MISMATCH;
        }
        if arg.is_const && !param.is_const {
            cost += CONST_MISMATCH;
        }
        cost
    }

    fn is_ellipsis(&self, ty: TypeId) -> bool {
        if !ty.is_valid() {
            return false;
        }
        match self.types.get(ty) {
            Type::Base { name } => {
                name.len() == 1 && name[0] == self.interner.intern("...")
            }
            _ => false,
        }
    }

    /// Find the best function named `name` for the given concrete
    /// argument types, walking the search list. Mirrors unqualified
    /// lookup: dummy using entries pool their candidates; the first real
    /// scope with candidates resolves.
    pub fn lookup_func(
        &self,
        name: Name,
        search: &[InfoId],
        args: &[TypeId],
    ) -> Result<sable_ir::DeclId, FuncLookupError> {
        let mut functions = Vec::new();
        for &id in search {
            self.find_functions(name, id, &mut functions);
            if self.info(id).is_using || functions.is_empty() {
                continue;
            }
            return match self.best_function(&functions, args) {
                Some((best, cost)) if cost < REJECT => Ok(best),
                _ => Err(FuncLookupError::NoViable(name)),
            };
        }
        // Candidates contributed by trailing dummy using entries.
        if functions.is_empty() {
            Err(FuncLookupError::NotFound(name))
        } else {
            match self.best_function(&functions, args) {
                Some((best, cost)) if cost < REJECT => Ok(best),
                _ => Err(FuncLookupError::NoViable(name)),
            }
        }
    }

    /// Operator lookup: the best member operator of the left operand's
    /// class races the best free operator found through ordinary scope
    /// search plus the enclosing scopes of either operand's type — an
    /// approximation of argument-associated lookup. The cheaper wins;
    /// the member wins ties.
    pub fn lookup_operator(
        &self,
        oper: Name,
        left: TypeId,
        right: TypeId,
        search: &[InfoId],
    ) -> Option<sable_ir::DeclId> {
        let left_info = self.type_info(left);
        let right_info = self.type_info(right);
        let left_user = self.is_user_type(left) && left_info.deref == 0;
        let right_user = self.is_user_type(right) && right_info.deref == 0;
        if !left_user && !right_user {
            // Builtin operands resolve to builtin operators, which are
            // not modeled.
            return None;
        }

        let best_method = self.as_class_decl(left).and_then(|class| {
            let info = self.info_of(class)?;
            let mut methods = Vec::new();
            self.find_functions(oper, info, &mut methods);
            self.best_function(&methods, &[right])
        });

        let mut functions = Vec::new();
        // Ordinary search: the first scope holding the name contributes.
        for &id in search {
            if self.dict_of(id).has_key(oper) {
                self.find_functions(oper, id, &mut functions);
                break;
            }
        }
        // Operators visible in the enclosing scope of each operand's own
        // type.
        for (ty, user) in [(left, left_user), (right, right_user)] {
            if !user {
                continue;
            }
            let Some(name) = self.types.get(self.follow_typedef(ty)).name() else {
                continue;
            };
            if name.len() > 1 {
                if let Some(info) = self.resolve_scope_by_name(&name[..name.len() - 1]) {
                    self.find_functions(oper, info, &mut functions);
                }
            }
        }
        let best_func = self.best_function(&functions, &[left, right]);

        match (best_method, best_func) {
            (Some((m, mc)), Some((f, fc))) => {
                let (winner, cost) = if fc < mc { (f, fc) } else { (m, mc) };
                (cost < REJECT).then_some(winner)
            }
            (Some((m, mc)), None) => (mc < REJECT).then_some(m),
            (None, Some((f, fc))) => (fc < REJECT).then_some(f),
            (None, None) => None,
        }
    }

    fn is_user_type(&self, ty: TypeId) -> bool {
        ty.is_valid()
            && matches!(
                self.types.get(self.follow_typedef(ty)),
                Type::Declared { .. } | Type::Template { .. } | Type::Parameterized { .. }
            )
    }
}
