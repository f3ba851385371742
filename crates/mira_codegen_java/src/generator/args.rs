use super::*;
use crate::types;
use mira_ast::{Argument, Expression, ParamSig, ResolvedCall};

impl JavaCodeGenerator {
    /// Renders the argument list of a call bound to a resolved signature.
    ///
    /// The resolver's parameter-to-actual mapping drives the rendering:
    /// missing actuals take declared defaults, trailing variadic actuals are
    /// packed into an array, and each actual whose static type does not fit
    /// its formal gets an explicit cast. The binder itself never hoists;
    /// hoists raised while rendering nested expressions land in the caller's
    /// context.
    pub(super) fn bind_arguments(
        &mut self,
        ctx: &mut GenContext,
        resolved: Option<&ResolvedCall>,
        args: &[Argument],
        trailing_closures: &[Expression],
    ) -> Result<String, CodeGenError> {
        let Some(resolved) = resolved else {
            let mut rendered = Vec::with_capacity(args.len() + trailing_closures.len());
            for arg in args {
                rendered.push(self.generate_expression(ctx, &arg.value)?);
            }
            for closure in trailing_closures {
                rendered.push(self.generate_expression(ctx, closure)?);
            }
            return Ok(rendered.join(", "));
        };

        let params = &resolved.signature.params;
        if resolved.param_args.len() != params.len() {
            return Err(CodeGenError::InvalidMethodSignature {
                message: format!(
                    "argument mapping covers {} of {} formals of {}",
                    resolved.param_args.len(),
                    params.len(),
                    resolved.signature.name
                ),
                span: None,
            });
        }

        let mut rendered = Vec::with_capacity(params.len());
        for (index, param) in params.iter().enumerate() {
            let slots = &resolved.param_args[index];
            if param.is_variadic {
                rendered.push(self.bind_variadic(
                    ctx,
                    param,
                    slots,
                    args,
                    trailing_closures,
                    &resolved.signature.name,
                )?);
                continue;
            }
            match slots.first() {
                Some(&slot) => {
                    let expr =
                        Self::actual_at(args, trailing_closures, slot, &resolved.signature.name)?;
                    let code = self.generate_expression(ctx, expr)?;
                    rendered.push(self.cast_if_needed(
                        &param.ty,
                        expr.static_type().as_ref(),
                        code,
                    ));
                }
                None => rendered.push(self.default_argument(ctx, param)?),
            }
        }
        Ok(rendered.join(", "))
    }

    fn actual_at<'a>(
        args: &'a [Argument],
        trailing_closures: &'a [Expression],
        slot: usize,
        call_name: &str,
    ) -> Result<&'a Expression, CodeGenError> {
        if slot < args.len() {
            Ok(&args[slot].value)
        } else {
            trailing_closures
                .get(slot - args.len())
                .ok_or_else(|| CodeGenError::MalformedTree {
                    message: format!(
                        "argument slot {} out of range for call to {}",
                        slot, call_name
                    ),
                    span: None,
                })
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_variadic(
        &mut self,
        ctx: &mut GenContext,
        param: &ParamSig,
        slots: &[usize],
        args: &[Argument],
        trailing_closures: &[Expression],
        call_name: &str,
    ) -> Result<String, CodeGenError> {
        let element_ty = match &param.ty {
            TypeRef::Array { element } => element.as_ref().clone(),
            _ => TypeRef::object(),
        };
        // A lone actual that is already an array passes through unchanged.
        if let [slot] = slots {
            let expr = Self::actual_at(args, trailing_closures, *slot, call_name)?;
            if matches!(expr.static_type(), Some(TypeRef::Array { .. })) {
                return self.generate_expression(ctx, expr);
            }
        }
        let mut rendered = Vec::with_capacity(slots.len());
        for &slot in slots {
            let expr = Self::actual_at(args, trailing_closures, slot, call_name)?;
            rendered.push(self.generate_expression(ctx, expr)?);
        }
        Ok(format!(
            "new {}[]{{{}}}",
            self.render_type(&element_ty),
            rendered.join(", ")
        ))
    }

    /// Expression substituted for a formal the call site left unbound.
    fn default_argument(
        &mut self,
        ctx: &mut GenContext,
        param: &ParamSig,
    ) -> Result<String, CodeGenError> {
        match &param.default_value {
            Some(default) => self.generate_expression(ctx, default),
            None => Ok(types::default_value(&param.ty).to_string()),
        }
    }

    /// Packs the actuals of an unresolved call into one `Object[]`. Named
    /// arguments collapse into a single leading map.
    pub(super) fn pack_dynamic_arguments(
        &mut self,
        ctx: &mut GenContext,
        args: &[Argument],
        trailing_closures: &[Expression],
    ) -> Result<String, CodeGenError> {
        let mut elements = Vec::new();

        let named: Vec<&Argument> = args.iter().filter(|arg| arg.name.is_some()).collect();
        if !named.is_empty() {
            let mut pairs = Vec::with_capacity(named.len() * 2);
            for arg in &named {
                let name = arg.name.as_deref().unwrap_or_default();
                pairs.push(format!("\"{}\"", Self::escape_string(name)));
                pairs.push(self.generate_expression(ctx, &arg.value)?);
            }
            elements.push(format!("{}.map({})", DYN_CLASS, pairs.join(", ")));
        }
        for arg in args.iter().filter(|arg| arg.name.is_none()) {
            elements.push(self.generate_expression(ctx, &arg.value)?);
        }
        for closure in trailing_closures {
            elements.push(self.generate_expression(ctx, closure)?);
        }
        Ok(format!("new java.lang.Object[]{{{}}}", elements.join(", ")))
    }
}
