//! Course Handlers

pub(crate) mod admins;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod index;
pub(crate) mod results;

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use scholarlink_app::domain::courses::records::{CourseRecord, CourseUuid};

    use crate::test_helpers::{TEST_SCHOOL_UUID, TEST_USER_UUID};

    pub(super) fn make_course(uuid: CourseUuid) -> CourseRecord {
        CourseRecord {
            uuid,
            school_uuid: TEST_SCHOOL_UUID,
            code: "MTH101".to_string(),
            title: "Mathematics".to_string(),
            description: String::new(),
            created_by: TEST_USER_UUID,
            admins: vec![TEST_USER_UUID],
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }
}
