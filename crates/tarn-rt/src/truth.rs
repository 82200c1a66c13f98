use crate::attr::Attr;
use crate::raise::RtResult;
use crate::runtime::Runtime;

/// Truth value of `attr`.
///
/// The canonical `True` and `False` objects answer by identity alone; anything else
/// goes through the program's `bool` conversion, whose result is compared with
/// `True`.
pub fn truth(rt: &Runtime, attr: &Attr) -> RtResult<bool> {
    let builtins = rt.builtins();
    if attr.is(&builtins.true_) {
        return Ok(true);
    }
    if attr.is(&builtins.false_) {
        return Ok(false);
    }
    let converted = (builtins.bool_fn)(rt, &[Attr::Null, attr.clone()])?;
    Ok(converted.is(&builtins.true_))
}
